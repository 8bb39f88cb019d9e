//! Room: the live set of connections and the fan-out rules.
//!
//! This module contains the pure state transitions of the room (join, leave,
//! broadcast, snapshot). It performs no awaiting and no locking, so it is owned and
//! driven by exactly one coordination task (`infrastructure::hub`).

use std::{collections::HashMap, sync::Arc};

use tokio::sync::mpsc::{self, error::TrySendError};

use super::{
    entity::{ChatMessage, Identity},
    value_object::{ConnectionId, RoomId, Timestamp},
};

/// Outbound queue of one connection (producer side)
pub type OutboundQueue = mpsc::Sender<Arc<ChatMessage>>;

/// Outbound queue of one connection (consumer side, drained by the write pump)
pub type OutboundReceiver = mpsc::Receiver<Arc<ChatMessage>>;

/// Whether the sender of a message also receives it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoPolicy {
    /// Every live connection, sender included
    #[default]
    All,
    /// Every live connection except the sender
    Others,
}

/// What the room does when a connection's outbound queue is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackpressurePolicy {
    /// Evict the connection; its write pump drains what is queued and closes the socket
    #[default]
    Disconnect,
    /// Skip this message for that connection only
    DropMessage,
}

/// Fan-out rules of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoomPolicy {
    pub echo: EchoPolicy,
    pub backpressure: BackpressurePolicy,
}

/// A registered connection
#[derive(Debug, Clone)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub identity: Arc<Identity>,
    pub joined_at: Timestamp,
    pub outbound: OutboundQueue,
}

impl Member {
    pub fn new(
        connection_id: ConnectionId,
        identity: Arc<Identity>,
        joined_at: Timestamp,
        outbound: OutboundQueue,
    ) -> Self {
        Self {
            connection_id,
            identity,
            joined_at,
            outbound,
        }
    }
}

/// Read-only view of one live participant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantSummary {
    pub connection_id: ConnectionId,
    pub identity: Arc<Identity>,
    pub joined_at: Timestamp,
}

/// Read-only view of the room
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// Sorted by join time, then by connection id
    pub participants: Vec<ParticipantSummary>,
}

impl RoomSnapshot {
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.participants.iter().map(|p| p.connection_id).collect()
    }
}

/// Outcome of one broadcast
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutReport {
    /// Connections the message was enqueued to
    pub delivered: Vec<ConnectionId>,
    /// Connections that missed the message but stay live
    pub dropped: Vec<ConnectionId>,
    /// Connections removed from the live set during this broadcast
    pub evicted: Vec<ConnectionId>,
}

/// The shared chat room
#[derive(Debug)]
pub struct Room {
    pub id: RoomId,
    pub created_at: Timestamp,
    policy: RoomPolicy,
    members: HashMap<ConnectionId, Member>,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self::with_policy(id, created_at, RoomPolicy::default())
    }

    pub fn with_policy(id: RoomId, created_at: Timestamp, policy: RoomPolicy) -> Self {
        Self {
            id,
            created_at,
            policy,
            members: HashMap::new(),
        }
    }

    pub fn policy(&self) -> RoomPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains_key(connection_id)
    }

    /// Add a connection to the live set. Always succeeds.
    pub fn join(&mut self, member: Member) {
        self.members.insert(member.connection_id, member);
    }

    /// Remove a connection from the live set.
    ///
    /// Returns `false` if it was not a member; removing twice is a no-op.
    pub fn leave(&mut self, connection_id: &ConnectionId) -> bool {
        self.members.remove(connection_id).is_some()
    }

    /// Enqueue `message` to every live connection without waiting.
    ///
    /// Full queues are handled by the backpressure policy; closed queues (write pump
    /// already gone) are always evicted.
    pub fn broadcast(&mut self, from: &ConnectionId, message: Arc<ChatMessage>) -> FanOutReport {
        let mut report = FanOutReport::default();

        for (connection_id, member) in &self.members {
            if self.policy.echo == EchoPolicy::Others && connection_id == from {
                continue;
            }

            match member.outbound.try_send(message.clone()) {
                Ok(()) => report.delivered.push(*connection_id),
                Err(TrySendError::Full(_)) => match self.policy.backpressure {
                    BackpressurePolicy::Disconnect => {
                        tracing::warn!(
                            "Outbound queue of '{}' ({}) is full, disconnecting",
                            member.identity.name().as_str(),
                            connection_id
                        );
                        report.evicted.push(*connection_id);
                    }
                    BackpressurePolicy::DropMessage => {
                        tracing::warn!(
                            "Outbound queue of '{}' ({}) is full, dropping message",
                            member.identity.name().as_str(),
                            connection_id
                        );
                        report.dropped.push(*connection_id);
                    }
                },
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!("Outbound queue of {} is closed, removing", connection_id);
                    report.evicted.push(*connection_id);
                }
            }
        }

        for connection_id in &report.evicted {
            self.members.remove(connection_id);
        }

        report
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        let mut participants: Vec<ParticipantSummary> = self
            .members
            .values()
            .map(|member| ParticipantSummary {
                connection_id: member.connection_id,
                identity: member.identity.clone(),
                joined_at: member.joined_at,
            })
            .collect();

        participants.sort_by(|a, b| {
            a.joined_at
                .cmp(&b.joined_at)
                .then_with(|| a.connection_id.cmp(&b.connection_id))
        });

        RoomSnapshot {
            id: self.id,
            created_at: self.created_at,
            participants,
        }
    }
}
