// SPDX-FileCopyrightText: 2026 Modtag Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trailing-edge debounce for search input.
//!
//! Values pushed within the quiet period collapse into the last one. Only
//! emission is delayed; a request started for an earlier value is not
//! cancelled when a newer one arrives.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Sender half; dropping it flushes any pending value and stops the task.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<T>,
    task: JoinHandle<()>,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawns the debounce task. Settled values arrive on the returned receiver.
    pub fn new(delay: Duration) -> (Self, mpsc::UnboundedReceiver<T>) {
        let (tx, mut input) = mpsc::unbounded_channel::<T>();
        let (output, settled) = mpsc::unbounded_channel();

        let task = tokio::spawn(async move {
            while let Some(mut pending) = input.recv().await {
                loop {
                    tokio::select! {
                        next = input.recv() => match next {
                            Some(value) => pending = value,
                            None => {
                                let _ = output.send(pending);
                                return;
                            }
                        },
                        () = tokio::time::sleep(delay) => {
                            if output.send(pending).is_err() {
                                return;
                            }
                            break;
                        }
                    }
                }
            }
        });

        (Self { tx, task }, settled)
    }

    /// Queues a value, restarting the quiet period.
    pub fn push(&self, value: T) {
        let _ = self.tx.send(value);
    }

    /// Whether the debounce task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_emits_last_value_once() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));
        debouncer.push("d");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("dr");
        tokio::time::sleep(Duration::from_millis(100)).await;
        debouncer.push("dragon");

        assert_eq!(settled.recv().await, Some("dragon"));
        assert!(settled.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn separated_values_each_emit() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_millis(300));
        debouncer.push(1);
        tokio::time::sleep(Duration::from_millis(400)).await;
        debouncer.push(2);

        assert_eq!(settled.recv().await, Some(1));
        assert_eq!(settled.recv().await, Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_flushes_pending_value() {
        let (debouncer, mut settled) = Debouncer::new(Duration::from_secs(10));
        debouncer.push("last");
        drop(debouncer);
        assert_eq!(settled.recv().await, Some("last"));
        assert_eq!(settled.recv().await, None);
    }
}
