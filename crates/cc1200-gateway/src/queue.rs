use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicU64, Ordering},
        Mutex, MutexGuard,
    },
};

use cc1200::Packet;

/// A bounded FIFO of received packets.
///
/// When full, pushing a packet drops the oldest one.
#[derive(Debug)]
pub struct PacketQueue {
    packets: Mutex<VecDeque<Packet>>,
    capacity: usize,
    dropped: AtomicU64,
}

impl PacketQueue {
    /// A queue holding at most `capacity` packets (at least 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            packets: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    fn packets(&self) -> MutexGuard<'_, VecDeque<Packet>> {
        self.packets.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Append a packet.
    ///
    /// Returns the packet that was dropped to make room, if any.
    pub fn push(&self, packet: Packet) -> Option<Packet> {
        let mut packets = self.packets();
        let dropped = if packets.len() >= self.capacity {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            packets.pop_front()
        } else {
            None
        };
        packets.push_back(packet);
        dropped
    }

    pub fn pop(&self) -> Option<Packet> {
        self.packets().pop_front()
    }

    pub fn len(&self) -> usize {
        self.packets().len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of packets dropped because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
