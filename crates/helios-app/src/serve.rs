//! JSON-lines bridge between stdio and the compute scheduler.
//!
//! Each input line is one request; each output line is one response, written
//! as soon as it completes. Bad lines get an `ERROR` response carrying the
//! line's `id` when one can be recovered.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use helios_config::Config;
use helios_ephemeris::{PrecisionEphemerisResolver, ResolverSettings};
use helios_worker::protocol::salvage_id;
use helios_worker::{
    ComputeError, ComputeScheduler, PrecisionBackend, Response, ResponseEnvelope, Router,
    decode_request, encode_response, resolve_worker_count,
};
use tracing::{debug, info, warn};

use crate::AppError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);
const BACKOFF: Duration = Duration::from_millis(1);

/// Counts from one bridge session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub accepted: u64,
    pub rejected: u64,
    pub written: u64,
}

/// Build the scheduler from config and serve stdin/stdout until EOF.
pub fn run(config: &Config) -> Result<(), AppError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .thread_name("helios-net")
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    let router = if config.ephemeris.precision_enabled {
        let settings = ResolverSettings {
            request_timeout: Duration::from_millis(config.ephemeris.request_timeout_ms),
            cache_ttl: Duration::from_secs(config.ephemeris.cache_ttl_secs),
        };
        let resolver = PrecisionEphemerisResolver::http(&config.ephemeris.horizons_url, settings);
        Router::with_precision(PrecisionBackend {
            resolver: Arc::new(resolver),
            runtime: runtime.handle().clone(),
        })
    } else {
        Router::analytic_only()
    };

    let workers = resolve_worker_count(config.scheduler.worker_count);
    let scheduler = ComputeScheduler::new(workers, config.scheduler.queue_capacity, router)?;
    info!(workers, precision = config.ephemeris.precision_enabled, "serving requests on stdio");

    let stdin = io::BufReader::new(io::stdin());
    let stdout = io::stdout().lock();
    let stats = run_bridge(stdin, stdout, &scheduler)?;
    info!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        written = stats.written,
        "input closed"
    );
    Ok(())
}

/// Pump requests from `input` into `scheduler` and responses to `output`.
///
/// Returns once `input` is exhausted and every accepted request has been
/// answered. A failed write stops the reader at its next line.
pub fn run_bridge<R, W>(input: R, mut output: W, scheduler: &ComputeScheduler) -> io::Result<BridgeStats>
where
    R: BufRead + Send,
    W: Write,
{
    let (reject_tx, reject_rx) = crossbeam_channel::unbounded::<ResponseEnvelope>();
    let results = scheduler.results();
    let writer_failed = AtomicBool::new(false);

    std::thread::scope(|scope| {
        let stop = &writer_failed;
        let reader = scope.spawn(move || read_requests(input, scheduler, &reject_tx, stop));
        let written = write_responses(&mut output, &results, &reject_rx, scheduler);
        if let Err(err) = &written {
            warn!(error = %err, "response output failed, closing input");
            writer_failed.store(true, Ordering::Release);
        }
        let (accepted, rejected) = reader
            .join()
            .map_err(|_| io::Error::other("request reader panicked"))??;
        Ok(BridgeStats {
            accepted,
            rejected,
            written: written?,
        })
    })
}

fn read_requests<R: BufRead>(
    input: R,
    scheduler: &ComputeScheduler,
    rejects: &Sender<ResponseEnvelope>,
    stop: &AtomicBool,
) -> io::Result<(u64, u64)> {
    let mut accepted = 0;
    let mut rejected = 0;
    for line in input.lines() {
        if stop.load(Ordering::Acquire) {
            debug!("output closed, ignoring remaining input");
            break;
        }
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let envelope = match decode_request(&line) {
            Ok(envelope) => envelope,
            Err(err) => {
                debug!(error = %err, "rejecting malformed request");
                rejected += 1;
                let _ = rejects.send(ResponseEnvelope::new(salvage_id(&line), Response::error(err.to_string())));
                continue;
            }
        };
        // Apply backpressure instead of dropping work when the queue is full.
        loop {
            match scheduler.submit(envelope.clone()) {
                Ok(()) => {
                    accepted += 1;
                    break;
                }
                Err(ComputeError::QueueFull(_)) if !stop.load(Ordering::Acquire) => {
                    std::thread::sleep(BACKOFF)
                }
                Err(ComputeError::QueueFull(_)) => break,
                Err(err) => {
                    warn!(error = %err, "scheduler refused request");
                    rejected += 1;
                    let _ = rejects.send(ResponseEnvelope::new(envelope.id, Response::error(err.to_string())));
                    break;
                }
            }
        }
    }
    Ok((accepted, rejected))
}

fn write_responses<W: Write>(
    output: &mut W,
    results: &Receiver<ResponseEnvelope>,
    rejects: &Receiver<ResponseEnvelope>,
    scheduler: &ComputeScheduler,
) -> io::Result<u64> {
    let mut written = 0;
    let mut reader_done = false;
    loop {
        if !reader_done {
            crossbeam_channel::select! {
                recv(results) -> msg => match msg {
                    Ok(envelope) => written += write_line(output, &envelope)?,
                    Err(_) => return Ok(written),
                },
                recv(rejects) -> msg => match msg {
                    Ok(envelope) => written += write_line(output, &envelope)?,
                    Err(_) => reader_done = true,
                },
            }
            continue;
        }

        match results.recv_timeout(POLL_INTERVAL) {
            Ok(envelope) => written += write_line(output, &envelope)?,
            Err(RecvTimeoutError::Timeout) => {
                if scheduler.in_flight_count() == 0 {
                    for envelope in results.try_iter() {
                        written += write_line(output, &envelope)?;
                    }
                    return Ok(written);
                }
            }
            Err(RecvTimeoutError::Disconnected) => return Ok(written),
        }
    }
}

fn write_line<W: Write>(output: &mut W, envelope: &ResponseEnvelope) -> io::Result<u64> {
    let line = encode_response(envelope).map_err(io::Error::other)?;
    writeln!(output, "{line}")?;
    output.flush()?;
    Ok(1)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::atomic::AtomicUsize;

    use serde_json::Value;

    use super::*;

    fn bridge(input: &str, workers: usize) -> (BridgeStats, Vec<Value>) {
        let scheduler = ComputeScheduler::new(workers, 4, Router::analytic_only()).unwrap();
        let mut output = Vec::new();
        let stats = run_bridge(Cursor::new(input.to_string()), &mut output, &scheduler).unwrap();
        let lines = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (stats, lines)
    }

    #[test]
    fn test_bridge_answers_every_line() {
        let input = concat!(
            r#"{"id":1,"type":"COMPUTE_POSITIONS","date":1718928000000,"bodies":["Earth","Mars","Unknownia"]}"#, "\n",
            r#"{"id":2,"type":"COMPUTE_MOON_PHASES","date":1706205240000}"#, "\n",
            "\n",
            r#"{"id":3,"type":"COMPUTE_RISE_SET","date":1718928000000,"lat":51.5,"lon":-0.12,"body":"Sun"}"#, "\n",
            r#"{"id":4,"type":"JPL_QUERY","date":1718928000000,"body":"Venus"}"#, "\n",
        );
        let (stats, lines) = bridge(input, 2);
        assert_eq!(stats, BridgeStats { accepted: 4, rejected: 0, written: 4 });

        let by_id: HashMap<u64, Value> = lines
            .into_iter()
            .map(|v| (v["id"].as_u64().unwrap(), v))
            .collect();
        assert_eq!(by_id[&1]["type"], "POSITIONS_RESULT");
        assert_eq!(by_id[&1]["positions"]["Unknownia"], serde_json::json!([0.0, 0.0, 0.0]));
        assert_eq!(by_id[&2]["type"], "MOON_PHASE_RESULT");
        assert_eq!(by_id[&3]["type"], "RISE_SET_RESULT");
        assert_eq!(by_id[&4]["type"], "JPL_RESULT");
    }

    #[test]
    fn test_malformed_lines_get_errors() {
        let input = concat!(
            "this is not json\n",
            r#"{"id":5,"type":"LAUNCH"}"#, "\n",
            r#"{"id":6,"type":"COMPUTE_MOON_PHASES","date":0}"#, "\n",
        );
        let (stats, lines) = bridge(input, 1);
        assert_eq!(stats.accepted, 1);
        assert_eq!(stats.rejected, 2);
        assert_eq!(lines.len(), 3);

        let errors: Vec<&Value> = lines.iter().filter(|v| v["type"] == "ERROR").collect();
        assert_eq!(errors.len(), 2);
        assert!(errors.iter().any(|v| v["id"] == 5));
        assert!(errors.iter().all(|v| v["message"].is_string()));
    }

    #[test]
    fn test_backpressure_keeps_every_request() {
        let line = r#"{"type":"COMPUTE_RISE_SET","date":1718928000000,"lat":40.0,"lon":-74.0,"body":"Moon"}"#;
        let input: String = (0..20).map(|_| format!("{line}\n")).collect();
        let (stats, lines) = bridge(&input, 1);
        assert_eq!(stats.accepted, 20);
        assert_eq!(lines.len(), 20);
    }

    #[test]
    fn test_empty_input() {
        let (stats, lines) = bridge("", 1);
        assert_eq!(stats, BridgeStats::default());
        assert!(lines.is_empty());
    }

    #[test]
    fn test_failed_output_stops_reading_input() {
        const TOTAL: usize = 1000;

        struct BrokenPipe<'a>(&'a AtomicBool);
        impl Write for BrokenPipe<'_> {
            fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
                self.0.store(true, Ordering::Release);
                Err(io::Error::from(io::ErrorKind::BrokenPipe))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        // Serves one line, then holds the rest back until the writer has failed.
        struct Lines<'a> {
            served: &'a AtomicUsize,
            write_attempted: &'a AtomicBool,
        }
        impl io::Read for Lines<'_> {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                let n = self.served.load(Ordering::Acquire);
                if n == TOTAL {
                    return Ok(0);
                }
                if n == 1 {
                    let start = std::time::Instant::now();
                    while !self.write_attempted.load(Ordering::Acquire) {
                        assert!(start.elapsed().as_secs() < 10, "writer never ran");
                        std::thread::sleep(Duration::from_millis(1));
                    }
                    std::thread::sleep(Duration::from_millis(100));
                }
                let line = format!("{{\"id\":{n},\"type\":\"COMPUTE_MOON_PHASES\",\"date\":0}}\n");
                buf[..line.len()].copy_from_slice(line.as_bytes());
                self.served.store(n + 1, Ordering::Release);
                Ok(line.len())
            }
        }

        let served = AtomicUsize::new(0);
        let write_attempted = AtomicBool::new(false);
        let input = io::BufReader::new(Lines {
            served: &served,
            write_attempted: &write_attempted,
        });
        let scheduler = ComputeScheduler::new(1, 4, Router::analytic_only()).unwrap();

        let result = run_bridge(input, BrokenPipe(&write_attempted), &scheduler);
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::BrokenPipe);
        assert!(served.load(Ordering::Acquire) < 5, "read {} lines", served.load(Ordering::Acquire));
    }
}
