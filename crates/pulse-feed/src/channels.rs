//! One unbounded FIFO channel per [`DataKind`].
//!
//! Fetch workers hold cloned [`ResultSenders`]; the aggregator owns the single
//! [`ResultReceivers`]. Within one kind, results arrive in completion order.

use crossbeam_channel::{Receiver, Sender, TryIter};
use pulse_core::types::{DataKind, FetchResult};
use tracing::warn;

/// Write side of the channel set. Cloned into every worker.
#[derive(Clone)]
pub struct ResultSenders {
    senders: [Sender<FetchResult>; DataKind::COUNT],
}

/// Read side of the channel set. Owned by the aggregator.
pub struct ResultReceivers {
    receivers: [Receiver<FetchResult>; DataKind::COUNT],
}

/// Create the channel set.
pub fn result_channels() -> (ResultSenders, ResultReceivers) {
    let (tx0, rx0) = crossbeam_channel::unbounded();
    let (tx1, rx1) = crossbeam_channel::unbounded();
    let (tx2, rx2) = crossbeam_channel::unbounded();
    let (tx3, rx3) = crossbeam_channel::unbounded();
    (ResultSenders { senders: [tx0, tx1, tx2, tx3] }, ResultReceivers { receivers: [rx0, rx1, rx2, rx3] })
}

impl ResultSenders {
    /// Route a result to its kind's channel. Never blocks.
    ///
    /// Returns `false` if the aggregator is gone (shutdown in progress).
    pub fn send(&self, result: FetchResult) -> bool {
        let kind = result.kind();
        if self.senders[kind.index()].send(result).is_err() {
            warn!("[channels] {kind} receiver dropped, result discarded");
            return false;
        }
        true
    }
}

impl ResultReceivers {
    /// Non-blocking drain of one kind's channel, stopping when it is empty.
    pub fn drain(&self, kind: DataKind) -> TryIter<'_, FetchResult> {
        self.receivers[kind.index()].try_iter()
    }

    /// Results waiting in one kind's channel.
    pub fn pending(&self, kind: DataKind) -> usize {
        self.receivers[kind.index()].len()
    }

    /// Results waiting across all channels.
    pub fn pending_total(&self) -> usize {
        self.receivers.iter().map(Receiver::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use pulse_core::types::{FetchPayload, Selection};

    use super::*;

    fn fx(rate: f64) -> FetchResult {
        FetchResult::new(Selection::default(), FetchPayload::FxRate(rate))
    }

    #[test]
    fn routes_by_kind_in_fifo_order() {
        let (tx, rx) = result_channels();
        assert!(tx.send(fx(0.91)));
        assert!(tx.send(FetchResult::new(Selection::default(), FetchPayload::Sentiment(None))));
        assert!(tx.send(fx(0.93)));

        assert_eq!(rx.pending(DataKind::FxRate), 2);
        assert_eq!(rx.pending(DataKind::Sentiment), 1);
        assert_eq!(rx.pending(DataKind::Price), 0);

        let rates: Vec<f64> = rx
            .drain(DataKind::FxRate)
            .map(|r| match r.payload {
                FetchPayload::FxRate(rate) => rate,
                other => panic!("unexpected payload {other:?}"),
            })
            .collect();
        assert_eq!(rates, vec![0.91, 0.93]);
        assert_eq!(rx.pending_total(), 1);
    }

    #[test]
    fn send_after_receiver_dropped_reports_false() {
        let (tx, rx) = result_channels();
        drop(rx);
        assert!(!tx.send(fx(0.9)));
    }

    #[test]
    fn senders_work_across_threads() {
        let (tx, rx) = result_channels();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let tx = tx.clone();
                std::thread::spawn(move || tx.send(fx(i as f64)))
            })
            .collect();
        for h in handles {
            assert!(h.join().unwrap());
        }
        assert_eq!(rx.drain(DataKind::FxRate).count(), 8);
    }
}
