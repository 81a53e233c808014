//! Background image resolution
//!
//! Requests go to a worker thread over one channel and resolutions come back
//! over another, so a slow lookup never stalls the event loop.

use mini_zoo_core::{resolve_with_fallback, ImageRequest, ImageResolution, ImageSource, ImageTicket};
use std::sync::mpsc;
use std::thread;
use tracing::{debug, warn};

pub struct ImageWorker {
    sender: Option<mpsc::Sender<ImageRequest>>,
    results: mpsc::Receiver<(ImageTicket, ImageResolution)>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ImageWorker {
    pub fn spawn(source: Box<dyn ImageSource>) -> Self {
        let (tx, rx) = mpsc::channel::<ImageRequest>();
        let (result_tx, results) = mpsc::channel();

        let handle = thread::Builder::new()
            .name("image-worker".into())
            .spawn(move || {
                while let Ok(request) = rx.recv() {
                    debug!(ticket = ?request.ticket, animal = %request.animal, "resolving image");
                    let resolution = resolve_with_fallback(source.as_ref(), &request.animal);
                    if result_tx.send((request.ticket, resolution)).is_err() {
                        break;
                    }
                }
            });

        let handle = match handle {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(error = %e, "could not start image worker");
                None
            }
        };

        Self {
            sender: handle.as_ref().map(|_| tx),
            results,
            handle,
        }
    }

    pub fn queue(&self, request: ImageRequest) -> bool {
        match self.sender {
            Some(ref tx) => tx.send(request).is_ok(),
            None => false,
        }
    }

    /// Every resolution that has arrived since the last poll
    pub fn poll(&self) -> Vec<(ImageTicket, ImageResolution)> {
        self.results.try_iter().collect()
    }

    /// Drop the sender so the worker exits, then join it
    pub fn finish(mut self) {
        self.sender.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mini_zoo_core::{ImageRef, PlaceholderSource};
    use std::time::Duration;

    #[test]
    fn test_worker_answers_requests() {
        let worker = ImageWorker::spawn(Box::new(PlaceholderSource));
        assert!(worker.queue(ImageRequest {
            ticket: ImageTicket(4),
            animal: "Fish".into(),
        }));

        let mut answers = Vec::new();
        for _ in 0..200 {
            answers.extend(worker.poll());
            if !answers.is_empty() {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(
            answers,
            vec![(
                ImageTicket(4),
                ImageResolution::Ready {
                    image: ImageRef::placeholder("Fish"),
                    fallback: false
                }
            )]
        );
        worker.finish();
    }
}
