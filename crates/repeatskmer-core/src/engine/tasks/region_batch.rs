use crate::engine::config::ExecutionConfig;
use crate::engine::error::EngineError;
use crate::engine::partition::partition;
use crate::engine::progress::{Progress, ProgressReporter};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::thread;
use tracing::{debug, instrument, warn};

/// Runs `process` over `items` on a dedicated worker pool and hands every
/// result to `consume` on the calling thread, in input order.
///
/// Items are split round-robin into one partition per worker. Workers stream
/// `(index, result)` pairs through a bounded channel; the caller is the single
/// consumer and buffers out-of-order results until their turn comes.
#[instrument(skip_all, name = "region_batch_task", fields(items = items.len()))]
pub fn run<T, R, P, C>(
    items: Vec<T>,
    execution: &ExecutionConfig,
    reporter: &ProgressReporter,
    process: P,
    mut consume: C,
) -> Result<(), EngineError>
where
    T: Send,
    R: Send,
    P: Fn(T) -> R + Sync,
    C: FnMut(usize, R),
{
    let total = items.len();
    reporter.report(Progress::TaskStart {
        total_steps: total as u64,
    });
    if total == 0 {
        reporter.report(Progress::TaskFinish);
        return Ok(());
    }

    let workers = execution.workers.min(total);
    let partitions = partition(items.into_iter().enumerate().collect(), workers)?;
    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("region-worker-{}", i))
        .build()
        .map_err(|e| EngineError::Initialization(format!("worker pool: {}", e)))?;
    debug!(workers, capacity = execution.channel_capacity, "Worker pool ready.");

    let (sender, receiver) = crossbeam_channel::bounded::<(usize, R)>(execution.channel_capacity);
    let process = &process;
    let pool = &pool;

    let delivered = thread::scope(|scope| {
        let producer = scope.spawn(move || {
            pool.install(|| {
                partitions
                    .into_par_iter()
                    .for_each_with(sender, |sender, partition| {
                        for (index, item) in partition {
                            if sender.send((index, process(item))).is_err() {
                                warn!("Result channel closed early; worker stopping.");
                                return;
                            }
                        }
                    });
            });
        });

        let mut pending = BTreeMap::new();
        let mut next = 0;
        for (index, result) in receiver.iter() {
            pending.insert(index, result);
            while let Some(result) = pending.remove(&next) {
                consume(next, result);
                reporter.report(Progress::TaskIncrement);
                next += 1;
            }
        }

        producer
            .join()
            .map_err(|_| EngineError::Internal("a region worker panicked".into()))?;
        Ok::<usize, EngineError>(next)
    })?;

    reporter.report(Progress::TaskFinish);
    if delivered != total {
        return Err(EngineError::Internal(format!(
            "expected {} results, received {}",
            total, delivered
        )));
    }
    Ok(())
}
