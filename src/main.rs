use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use clap::Parser;
use futures_core::Stream;
use serde::Serialize;

use herald::builder::Fragment;
use herald::collection::{
    CellRegistration, CollectionView, DiffableDataSource, ListAppearance, Snapshot, SnapshotDiff,
};
use herald::config::{HeraldConfig, StackConfig};
use herald::fragments;
use herald::render::{bind_linear, bind_snapshot};
use herald::stream::{CancelBag, CurrentValueSubject, MainQueue, PublisherExt, StreamSource};
use herald::view::{Label, Screen, StackView, View, ViewTree};
use herald::{logging, HeraldError};

#[derive(Parser, Debug)]
#[command(name = "herald")]
#[command(about = "Drive a stack and a collection view from timed streams and print the result")]
struct Cli {
    /// Config file (default: $CONFIG_DIR/herald/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of values each stream delivers
    #[arg(long, default_value_t = 5)]
    ticks: u32,

    /// Milliseconds between values
    #[arg(long, default_value_t = 40)]
    interval_ms: u64,

    /// Print the view trees as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Section {
    Latest,
    Earlier,
}

type Feed = Snapshot<Section, u32>;

/// Yields `items` one per `interval` tick, then ends.
struct Paced<T> {
    interval: tokio::time::Interval,
    items: VecDeque<T>,
}

impl<T> Paced<T> {
    /// Must be called inside a tokio runtime.
    fn new(period: Duration, items: impl IntoIterator<Item = T>) -> Self {
        Self {
            interval: tokio::time::interval(period),
            items: items.into_iter().collect(),
        }
    }
}

impl<T: Unpin> Stream for Paced<T> {
    type Item = T;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        let this = self.get_mut();
        if this.items.is_empty() {
            return Poll::Ready(None);
        }
        match this.interval.poll_tick(cx) {
            Poll::Ready(_) => Poll::Ready(this.items.pop_front()),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[derive(Serialize)]
struct Report {
    ticks: u32,
    stack_generation: u64,
    snapshots_applied: u64,
    last_diff: Option<SnapshotDiff>,
    screen: ViewTree,
}

fn load_config(path: Option<&Path>) -> Result<HeraldConfig, HeraldError> {
    let config = match path {
        Some(path) => HeraldConfig::load_from(path)?,
        None => HeraldConfig::load()?,
    };
    Ok(config)
}

/// Newest three numbers up front, the rest below in descending order.
fn feed_for(tick: u32) -> Result<Feed, HeraldError> {
    let latest: Vec<u32> = (tick.saturating_sub(2).max(1)..=tick).rev().collect();
    let earlier: Vec<u32> = (1..tick.saturating_sub(2).max(1)).rev().collect();
    let snapshot = Feed::empty()
        .try_appending_sections([Section::Latest, Section::Earlier])?
        .try_appending_items_to(latest, &Section::Latest)?
        .try_appending_items_to(earlier, &Section::Earlier)?;
    Ok(snapshot)
}

fn counter_rows(tick: u32) -> Fragment {
    fragments![
        Label::new(format!("tick {tick}")).bold(),
        Fragment::optional(tick % 2 == 0, || Label::new("even").italic()),
        Fragment::either(tick >= 3, View::spacer, Vec::<View>::new),
    ]
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    logging::init_tracing(&config.logging);

    let plan = (1..=cli.ticks)
        .map(feed_for)
        .collect::<Result<Vec<_>, _>>()?;
    let final_feed = plan.last().cloned().unwrap_or_default();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;
    let _enter = runtime.enter();

    let queue = MainQueue::new();
    let main_thread = queue.handle();
    let period = Duration::from_millis(cli.interval_ms.max(1));
    let mut bag = CancelBag::new();

    let title = Arc::new(CurrentValueSubject::new("waiting".to_string()));
    let counter = StackView::empty(config.stack);
    let counter_source = StreamSource::new(Paced::new(period, 1..=cli.ticks)).receive_on(&main_thread);
    let progress = Arc::clone(&title);
    let total = cli.ticks;
    bind_linear(&counter, &counter_source, move |tick: u32| {
        progress.send(format!("{tick} of {total}"));
        counter_rows(tick)
    })
    .store_in(&mut bag);

    let collection = CollectionView::list(ListAppearance::InsetGrouped);
    let registration = CellRegistration::list("number", |content, item: &u32| {
        content.text = Some(format!("#{item}"));
        content.secondary_text = (item % 5 == 0).then(|| "multiple of five".to_string());
    });
    let data_source = DiffableDataSource::with_registration(&collection, registration)
        .with_config(&config.render);
    let feed_source = StreamSource::new(Paced::new(period, plan)).receive_on(&main_thread);
    bind_snapshot(&data_source, &feed_source).store_in(&mut bag);

    let mut screen = Screen::new();
    let content = StackView::new(
        StackConfig::vertical().with_spacing(config.stack.spacing),
        fragments![Label::bound(&*title), counter.clone(), collection.clone()],
    );
    screen.render(|| content.view().clone());

    let deadline = Instant::now().checked_add(settle_budget(period, cli.ticks));
    let frame = Duration::from_millis(16);
    loop {
        queue.run_next(frame);
        collection.commit_animations();

        let settled = counter.render_state().generation() == u64::from(cli.ticks)
            && data_source.snapshot() == final_feed
            && !data_source.is_applying()
            && !data_source.has_queued_apply();
        if settled {
            break;
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::warn!("streams did not settle before the deadline");
            break;
        }
    }

    let report = Report {
        ticks: cli.ticks,
        stack_generation: counter.render_state().generation(),
        snapshots_applied: data_source.applied_count(),
        last_diff: collection.last_diff(),
        screen: screen.root().tree(),
    };

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!(
            "ticks: {}  stack generation: {}  snapshots applied: {}",
            report.ticks, report.stack_generation, report.snapshots_applied
        );
        print!("{}", report.screen.render());
    }

    bag.cancel_all();
    counter.tear_down();
    collection.tear_down();
    Ok(())
}

/// How long the demo waits for both streams to settle. Saturates instead of
/// overflowing for huge tick counts or periods.
fn settle_budget(period: Duration, ticks: u32) -> Duration {
    period
        .saturating_mul(ticks.saturating_add(2))
        .saturating_add(Duration::from_secs(2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settle_budget_covers_every_tick() {
        assert_eq!(
            settle_budget(Duration::from_millis(100), 8),
            Duration::from_millis(3000)
        );
    }

    #[test]
    fn settle_budget_saturates() {
        assert_eq!(settle_budget(Duration::MAX, u32::MAX), Duration::MAX);
        assert_eq!(
            settle_budget(Duration::from_secs(1), u32::MAX),
            Duration::from_secs(u64::from(u32::MAX) + 2)
        );
    }
}
