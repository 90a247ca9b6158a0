use anyhow::{anyhow, Context, Result};
use crossbeam::channel::{bounded, select, Receiver, Sender};
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use squat_counter::{
    DetectionBatch, Error, FrameProcessor, PhaseThresholds, ProcessorConfig, StateRecord,
};
use std::{
    fs::File,
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use structopt::StructOpt;
use tracing::{debug, info};
use tracing_subscriber::layer::SubscriberExt;

#[derive(structopt::StructOpt)]
struct Opt {
    /// JSON lines file with one detection batch per line, or `-` for stdin.
    #[structopt(default_value = "-")]
    input: PathBuf,

    #[structopt(short, long, default_value = "info", env = "RUST_LOG")]
    log_level: tracing_subscriber::filter::EnvFilter,

    #[structopt(flatten)]
    thresholds: PhaseThresholds,

    /// Forget entities that have not been seen for this many frames.
    #[structopt(short, long)]
    evict_after: Option<u64>,

    /// Write per-detection state records as JSON lines to this file.
    #[structopt(short, long)]
    records: Option<PathBuf>,

    #[structopt(short, long, default_value = "1000")]
    queue_size: usize,

    #[structopt(short, long)]
    show_progress: bool,
}

#[derive(Serialize)]
struct FrameRecord<'a> {
    frame: u64,
    #[serde(flatten)]
    record: &'a StateRecord,
}

fn open_input(path: &Path) -> Result<Box<dyn BufRead + Send>, Error> {
    if path == Path::new("-") {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path).map_err(|e| Error::OpenInput(e, path.to_owned()))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

fn read_batches<R>(input: R, batches_tx: &Sender<DetectionBatch>) -> Result<(), Error>
where
    R: BufRead,
{
    for (i, line) in input.lines().enumerate() {
        let line = line.map_err(Error::ReadBatch)?;
        if line.trim().is_empty() {
            continue;
        }

        let batch = serde_json::from_str(&line).map_err(|e| Error::ParseBatch(e, i + 1))?;

        // the processing side hung up
        if batches_tx.send(batch).is_err() {
            break;
        }
    }
    Ok(())
}

/// Process batches until the reader hangs up or an interrupt arrives.
///
/// Returns `true` if interrupted.
fn drain_batches(
    processor: &mut FrameProcessor,
    batches_rx: &Receiver<DetectionBatch>,
    interrupt_rx: &Receiver<()>,
    out: &mut dyn Write,
    mut records: Option<&mut dyn Write>,
    pb_reps: Option<&ProgressBar>,
) -> Result<bool> {
    loop {
        let mut interrupted = false;
        let batch = select! {
            recv(batches_rx) -> batch => batch.ok(),
            recv(interrupt_rx) -> _ => {
                interrupted = true;
                None
            }
        };
        let batch = match batch {
            Some(batch) => batch,
            None => return Ok(interrupted),
        };

        let frame = processor.process(batch);

        for record in &frame.states {
            debug!(
                entity = %record.entity_id,
                previous = ?record.previous_state,
                current = ?record.current_state,
                reps = record.rep_count,
                "state record"
            );
            if let Some(records) = records.as_mut() {
                let line = FrameRecord {
                    frame: processor.frame_num(),
                    record,
                };
                serde_json::to_writer(&mut **records, &line).map_err(Error::WriteRecord)?;
                writeln!(records).context("failed writing record delimiter")?;
            }
        }

        serde_json::to_writer(&mut *out, &frame.batch).map_err(Error::WriteBatch)?;
        writeln!(out).context("failed writing batch delimiter")?;

        if let Some(pb_reps) = pb_reps {
            let reps: u64 = processor
                .store()
                .iter()
                .map(|(_, state)| state.rep_count)
                .sum();
            pb_reps.set_message(format!(
                "frame: {}, entities: {}, reps: {}",
                processor.frame_num(),
                processor.store().len(),
                reps
            ));
            pb_reps.inc(1);
        }
    }
}

fn main() -> Result<()> {
    let Opt {
        input,
        log_level,
        thresholds,
        evict_after,
        records,
        queue_size,
        show_progress,
    } = Opt::from_args();

    tracing::subscriber::set_global_default(
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .with(log_level),
    )?;

    let input = open_input(&input).context("failed opening detection batches")?;
    let mut records = records
        .map(|path| {
            File::create(&path)
                .map(BufWriter::new)
                .map_err(|e| Error::CreateRecords(e, path))
        })
        .transpose()?;

    let (interrupt_tx, interrupt_rx) = bounded(1);
    ctrlc::set_handler(move || {
        let _ = interrupt_tx.try_send(());
    })
    .context("failed setting Ctrl-C handler")?;

    let mut processor = FrameProcessor::new(ProcessorConfig {
        thresholds,
        evict_after,
    });

    let pb_reps = if show_progress {
        Some(
            ProgressBar::new_spinner().with_style(
                ProgressStyle::default_spinner()
                    .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
                    .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
            ),
        )
    } else {
        None
    };

    let (batches_tx, batches_rx) = bounded(queue_size);

    // a blocking read on stdin cannot be cancelled, so the reader is only
    // joined once it has hung up on its own
    let reader = std::thread::spawn(move || read_batches(input, &batches_tx));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let interrupted = drain_batches(
        &mut processor,
        &batches_rx,
        &interrupt_rx,
        &mut out,
        records.as_mut().map(|records| records as &mut dyn Write),
        pb_reps.as_ref(),
    )?;

    if interrupted {
        info!("interrupted, stopping");
    } else {
        reader
            .join()
            .map_err(|_| anyhow!("batch reader thread panicked"))?
            .context("failed reading detection batches")?;
    }

    if let Some(records) = records.as_mut() {
        records.flush().context("failed flushing state records")?;
    }

    if let Some(pb_reps) = pb_reps {
        pb_reps.finish_and_clear();
    }

    let mut summary: Vec<_> = processor.store().iter().collect();
    summary.sort_by(|(a, _), (b, _)| a.cmp(b));
    for (id, state) in summary {
        info!(
            message = "final state",
            entity = %id,
            state = ?state.current,
            reps = state.rep_count
        );
    }

    Ok(())
}
