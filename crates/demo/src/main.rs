//! Medial demo binary.
//!
//! Drives a progress mediator from a background worker: the worker reports
//! through a binding, the owning context applies each report, and the main
//! loop stops once the task completes.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use clap::Parser;
use medial::{ContextConfig, Mediate, Mediator, OwningContext, field};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Demo command line arguments.
#[derive(Parser, Debug)]
#[command(name = "medial-demo")]
#[command(about = "Drive a mediator from a background worker")]
struct Args {
	/// KDL file with a `context` block
	#[arg(short, long, value_name = "PATH")]
	config: Option<PathBuf>,

	/// Number of steps the worker reports
	#[arg(short, long, default_value_t = 10)]
	steps: u32,

	/// Delay between reports, in milliseconds
	#[arg(long, default_value_t = 50)]
	delay_ms: u64,

	/// Verbose logging
	#[arg(short, long)]
	verbose: bool,
}

/// Renders a task's progress as a text bar.
struct ProgressBar;

struct BarStyle {
	width: usize,
}

#[derive(Debug, Clone, Default)]
struct Task {
	label: String,
	done: u32,
	total: u32,
}

impl Mediate for ProgressBar {
	type Capabilities = BarStyle;
	type Input = Task;
	type Content = String;

	fn content(&self, style: &BarStyle, task: &Task) -> String {
		let filled = match task.total {
			0 => 0,
			total => style.width * task.done.min(total) as usize / total as usize,
		};
		format!(
			"{} [{}{}] {}/{}",
			task.label,
			"#".repeat(filled),
			"-".repeat(style.width - filled),
			task.done,
			task.total
		)
	}
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	setup_tracing(args.verbose);

	let config = match &args.config {
		Some(path) => ContextConfig::load(path)?,
		None => ContextConfig::named("ui"),
	};
	info!(context = %config.name, max_jobs = config.drain_budget.max_jobs, "starting medial-demo");

	let mut ctx = OwningContext::with_config(config);
	let task = Task {
		label: "indexing".to_string(),
		done: 0,
		total: args.steps,
	};
	let mediator = Mediator::new(ProgressBar, BarStyle { width: 20 }, task, ctx.handle());

	let shutdown = CancellationToken::new();
	let stop = shutdown.clone();
	let weak = mediator.downgrade();
	let total = args.steps;
	let _progress = mediator.subscribe(move |version| {
		let Some(line) = weak.content() else {
			return;
		};
		println!("{line}");
		tracing::debug!(version, "progress redrawn");
		if version >= u64::from(total) {
			stop.cancel();
		}
	});

	println!("{}", mediator.content());
	if total == 0 {
		return Ok(());
	}

	let done = mediator.binding(field!(Task => done));
	let delay = Duration::from_millis(args.delay_ms);
	let worker = thread::spawn(move || {
		for step in 1..=total {
			thread::sleep(delay);
			done.set(step);
		}
	});

	ctx.run(&shutdown).await?;
	if worker.join().is_err() {
		tracing::warn!("worker panicked");
	}

	info!(version = mediator.version(), "finished");
	mediator.view(|line| println!("{line}"));
	Ok(())
}

fn setup_tracing(verbose: bool) {
	use tracing_subscriber::EnvFilter;
	use tracing_subscriber::prelude::*;

	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
		if verbose {
			EnvFilter::new("medial=debug,medial_context=debug,info")
		} else {
			EnvFilter::new("info")
		}
	});

	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();
}
