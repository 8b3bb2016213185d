//! Worker-thread plumbing between the overlay controller and a provider.
//!
//! The UI loop dispatches `FetchRequest`s and drains `FetchResult`s without
//! ever blocking; the worker runs one request at a time to completion. A
//! request dispatched while an earlier one is still running simply queues
//! behind it; the generation numbers sort out which result wins.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;

use tracing::debug;

use crate::poi::overpass::{FetchError, PoiProvider};
use crate::poi::{FetchRequest, Poi};

/// A completed fetch, tagged with the generation assigned at dispatch.
pub struct FetchResult {
    pub generation: u64,
    pub result: Result<Vec<Poi>, FetchError>,
}

/// Handle owned by the UI loop; the worker thread exits when it drops.
pub struct FetchHandle {
    requests: Sender<FetchRequest>,
    results: Receiver<FetchResult>,
}

impl FetchHandle {
    pub fn spawn<P: PoiProvider>(provider: P) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<FetchRequest>();
        let (result_tx, result_rx) = mpsc::channel();

        thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                debug!(generation = request.generation, "poi fetch started");
                let result = provider.fetch(&request.bounds);
                let done = FetchResult {
                    generation: request.generation,
                    result,
                };
                if result_tx.send(done).is_err() {
                    break;
                }
            }
        });

        Self {
            requests: request_tx,
            results: result_rx,
        }
    }

    /// Queue a request for the worker. A send failure means the worker is
    /// gone, which only happens during shutdown.
    pub fn dispatch(&self, request: FetchRequest) {
        let _ = self.requests.send(request);
    }

    /// Non-blocking drain of one completed fetch, if any.
    pub fn try_recv(&self) -> Option<FetchResult> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::LatLngBounds;
    use std::time::Duration;

    struct StubProvider;

    impl PoiProvider for StubProvider {
        fn fetch(&self, bounds: &LatLngBounds) -> Result<Vec<Poi>, FetchError> {
            Ok(vec![Poi {
                id: 7,
                name: "stub".into(),
                category: "cafe".into(),
                lat: bounds.south,
                lon: bounds.west,
            }])
        }
    }

    #[test]
    fn round_trips_generation_and_result() {
        let handle = FetchHandle::spawn(StubProvider);
        handle.dispatch(FetchRequest {
            generation: 42,
            bounds: LatLngBounds {
                north: 1.0,
                south: 0.0,
                east: 1.0,
                west: 0.0,
            },
        });

        let mut received = None;
        for _ in 0..100 {
            if let Some(result) = handle.try_recv() {
                received = Some(result);
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }

        let result = received.expect("worker should reply");
        assert_eq!(result.generation, 42);
        assert_eq!(result.result.expect("stub succeeds").len(), 1);
    }
}
