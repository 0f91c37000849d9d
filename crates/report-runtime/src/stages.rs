//! Chart stages: each one turns an aggregate into a render-ready view.
//!
//! Stages run in the order of [`standard_stages`]. A stage whose data is
//! missing returns the aggregator's [`SkipReason`].

use report_core::error::SkipReason;
use report_core::models::{Ledger, MealPeriod};
use report_data::aggregator::SpendingAggregator;
use report_data::distribution::{CanteenDistribution, OTHER_LABEL};
use report_data::extremes::{Extremes, COLUMNS};
use report_render::charts::pie::merge_small_slices;
use report_render::palette;
use report_render::views::{
    Bar, BarChart, ChartView, DumbbellChart, PieChart, StackSegment, StackedBarChart, TableImage,
    TimeMarkers, ValueFormat,
};

/// Inputs shared by every stage.
#[derive(Debug, Clone, Copy)]
pub struct ReportContext<'a> {
    /// Every row left after location filtering, any event kind.
    pub ledger: &'a Ledger,
    /// The spending rows of `ledger`.
    pub spending: &'a Ledger,
    /// Reporting year for the yearly chart and the extremes table.
    pub year: i32,
    /// Pie slices below this percentage merge into the other slice.
    pub other_share: f64,
    /// Canteens below this visit count merge into the other segment.
    pub min_canteen_visits: u32,
}

/// A view plus the file stem it is saved under.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedChart {
    pub file_stem: String,
    pub view: ChartView,
}

impl PlannedChart {
    /// Saved under its own title.
    fn titled(view: ChartView) -> Self {
        Self {
            file_stem: view.title().to_string(),
            view,
        }
    }
}

pub type StageFn = fn(&ReportContext<'_>) -> Result<PlannedChart, SkipReason>;

/// One named step of the report.
#[derive(Clone, Copy)]
pub struct Stage {
    pub name: &'static str,
    pub build: StageFn,
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage").field("name", &self.name).finish()
    }
}

/// The twelve report charts in output order.
pub fn standard_stages() -> Vec<Stage> {
    vec![
        Stage { name: "location totals (bar)", build: location_totals_bar },
        Stage { name: "location totals (pie)", build: location_totals_pie },
        Stage { name: "yearly spending", build: yearly_spending },
        Stage { name: "monthly daily average", build: monthly_daily_average },
        Stage { name: "meal totals", build: meal_totals },
        Stage { name: "meal visit counts", build: meal_visit_counts },
        Stage { name: "meal averages", build: meal_averages },
        Stage { name: "canteen meal averages", build: canteen_meal_averages },
        Stage { name: "yearly extremes", build: yearly_extremes },
        Stage { name: "first and last meal times", build: meal_time_ranges },
        Stage { name: "meal attendance", build: meal_attendance },
        Stage { name: "canteen per meal", build: canteen_distribution },
    ]
}

// ── Location charts ───────────────────────────────────────────────────────────

pub fn location_totals_bar(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let totals = SpendingAggregator::location_totals(ctx.spending)?;
    let bars = totals
        .into_iter()
        .map(|t| Bar::new(t.location, t.amount))
        .collect();

    let mut chart = BarChart::new("各食堂消费总额统计（柱形图）", bars, palette::SKY_BLUE)
        .axes("交易地点", "总金额 (元)");
    chart.vertical_labels = true;
    chart.size = (1200, 700);
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn location_totals_pie(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let totals = SpendingAggregator::location_totals(ctx.spending)?;
    let slices: Vec<Bar> = totals
        .into_iter()
        .map(|t| Bar::new(t.location, t.amount))
        .collect();
    if merge_small_slices(&slices, ctx.other_share, OTHER_LABEL).is_empty() {
        return Err(SkipReason::NoSpending);
    }

    Ok(PlannedChart::titled(ChartView::Pie(PieChart {
        title: "各食堂消费总额统计（扇形图）".to_string(),
        legend_title: "食堂".to_string(),
        slices,
        min_share: ctx.other_share,
        other_label: OTHER_LABEL.to_string(),
        size: (1160, 900),
    })))
}

// ── Calendar charts ───────────────────────────────────────────────────────────

pub fn yearly_spending(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let yearly = SpendingAggregator::yearly_spending(ctx.ledger, ctx.year)?;
    let bars = yearly
        .monthly
        .iter()
        .enumerate()
        .map(|(i, amount)| Bar::new(format!("{}月", i + 1), *amount))
        .collect();

    let mut chart = BarChart::new(format!("{}年食堂消费统计", yearly.year), bars, palette::CORNFLOWER_BLUE)
        .axes("月份", "每月消费 (元)");
    chart.headline = Some(format!("{}年共消费 {:.2} 元", yearly.year, yearly.total));
    chart.size = (1000, 560);
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn monthly_daily_average(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let months = SpendingAggregator::monthly_daily_average(ctx.spending)?;
    let bars = months
        .iter()
        .map(|m| Bar::new(m.label(), m.average))
        .collect();

    let mut chart = BarChart::new("各月份日均食堂消费", bars, palette::MEDIUM_SEA_GREEN)
        .axes("年月", "日均消费金额 (元)");
    chart.size = (1200, 600);
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

// ── Meal-period charts ────────────────────────────────────────────────────────

fn period_bars<T: Copy>(values: &[(MealPeriod, T)], to_f64: impl Fn(T) -> f64) -> Vec<Bar> {
    values
        .iter()
        .map(|(period, v)| Bar::new(period.label(), to_f64(*v)))
        .collect()
}

pub fn meal_totals(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let totals = SpendingAggregator::meal_totals(ctx.spending)?;
    let chart = BarChart::new(
        "各餐消费总额",
        period_bars(&totals, |v| v),
        palette::CORNFLOWER_BLUE,
    )
    .axes("餐次", "消费总额 (元)");
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn meal_visit_counts(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let counts = SpendingAggregator::meal_visit_counts(ctx.spending)?;
    let mut chart = BarChart::new(
        "各餐次数统计",
        period_bars(&counts, f64::from),
        palette::LIGHT_SALMON,
    )
    .axes("", "用餐次数");
    chart.format = ValueFormat::Count;
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn meal_averages(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let averages = SpendingAggregator::meal_averages(ctx.spending)?;
    let chart = BarChart::new(
        "各餐顿均消费",
        period_bars(&averages, |v| v),
        palette::MEDIUM_SLATE_BLUE,
    )
    .axes("餐次", "顿均消费 (元)");
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn canteen_meal_averages(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let averages = SpendingAggregator::location_meal_average(ctx.spending)?;
    let bars = averages
        .into_iter()
        .map(|a| Bar::new(a.location, a.amount))
        .collect();

    let mut chart = BarChart::new("各食堂顿均消费", bars, palette::PLUM)
        .axes("交易地点", "顿均消费 (元)");
    chart.vertical_labels = true;
    chart.size = (1200, 700);
    Ok(PlannedChart::titled(ChartView::Bar(chart)))
}

pub fn yearly_extremes(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let extremes = Extremes::compute(ctx.spending, ctx.year)?;
    Ok(PlannedChart::titled(ChartView::Table(TableImage {
        title: format!("{}年刷卡消费之最", extremes.year),
        columns: COLUMNS.iter().map(|c| c.to_string()).collect(),
        rows: extremes.rows().into_iter().map(Vec::from).collect(),
        size: (1000, 380),
    })))
}

pub fn meal_time_ranges(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let ranges = SpendingAggregator::meal_time_ranges(ctx.spending)?;
    let rows = ranges
        .iter()
        .map(|r| {
            let markers = r.span.map(|s| TimeMarkers {
                first: s.first,
                last: s.last,
                average: s.average_first,
            });
            (r.period.label().to_string(), markers)
        })
        .collect();

    Ok(PlannedChart::titled(ChartView::Dumbbell(DumbbellChart {
        title: "各餐第一笔与最后一笔消费时间".to_string(),
        x_desc: "餐次".to_string(),
        y_desc: "时间".to_string(),
        rows,
        size: (800, 640),
    })))
}

pub fn meal_attendance(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let report = SpendingAggregator::attendance(ctx.spending)?;
    let bars = report
        .periods
        .iter()
        .map(|p| Bar::new(p.period.label(), p.rate))
        .collect();

    let mut chart = BarChart::new("各餐出勤率（用餐次数/统计周期）", bars, palette::SEA_GREEN)
        .axes("餐次", "出勤率 (%)");
    chart.format = ValueFormat::Percent;
    chart.min_top = Some(100.0);
    Ok(PlannedChart {
        file_stem: "各餐出勤率".to_string(),
        view: ChartView::Bar(chart),
    })
}

pub fn canteen_distribution(ctx: &ReportContext<'_>) -> Result<PlannedChart, SkipReason> {
    let dist = CanteenDistribution::build(ctx.spending, ctx.min_canteen_visits)?;

    let categories = dist
        .periods
        .iter()
        .map(|p| p.period.label().to_string())
        .collect();
    let stacks = dist
        .periods
        .iter()
        .map(|p| {
            p.segments
                .iter()
                .map(|s| StackSegment {
                    label: s.canteen.clone(),
                    count: s.count,
                })
                .collect()
        })
        .collect();

    Ok(PlannedChart::titled(ChartView::Stacked(StackedBarChart {
        title: "每餐去哪家食堂（次数）".to_string(),
        x_desc: "餐次".to_string(),
        y_desc: "次数".to_string(),
        legend_title: "食堂".to_string(),
        categories,
        stacks,
        muted_series: dist.has_other().then(|| OTHER_LABEL.to_string()),
        series: dist.canteens,
        size: (1240, 640),
    })))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
