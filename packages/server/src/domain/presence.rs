//! Presence: who is connected, and which room each joined connection is in.
//!
//! [`ConnectionRegistry`] and [`RoomMembership`] are only mutated through
//! [`Presence`], whose operations update both in one step so the two views never
//! disagree.

use std::collections::{HashMap, HashSet};

use super::{ConnectionId, DisplayName, Participant, PresenceError, RoomName, Timestamp};

/// Connection identity → participant identity (`None` until the connection joins).
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<ConnectionId, Option<Participant>>,
}

impl ConnectionRegistry {
    /// Registers an unjoined connection. Registering twice keeps the existing entry.
    pub fn register(&mut self, id: ConnectionId) {
        self.connections.entry(id).or_insert(None);
    }

    pub fn is_registered(&self, id: &ConnectionId) -> bool {
        self.connections.contains_key(id)
    }

    /// Stores the identity for an already registered connection and returns the
    /// identity it replaces. Unknown connections are left untouched.
    pub fn set_identity(&mut self, participant: Participant) -> Option<Participant> {
        match self.connections.get_mut(&participant.id) {
            Some(slot) => slot.replace(participant),
            None => None,
        }
    }

    pub fn get(&self, id: &ConnectionId) -> Option<&Participant> {
        self.connections.get(id).and_then(Option::as_ref)
    }

    fn get_mut(&mut self, id: &ConnectionId) -> Option<&mut Participant> {
        self.connections.get_mut(id).and_then(Option::as_mut)
    }

    /// Deletes the connection and returns its identity if it had joined.
    pub fn remove(&mut self, id: &ConnectionId) -> Option<Participant> {
        self.connections.remove(id).flatten()
    }

    /// Every joined participant, in no particular order.
    pub fn list_all(&self) -> Vec<Participant> {
        self.connections.values().flatten().cloned().collect()
    }

    /// Live connections, joined or not.
    pub fn count(&self) -> usize {
        self.connections.len()
    }
}

/// Room → connections currently joined to it. Unknown rooms are empty rooms.
#[derive(Debug, Default)]
pub struct RoomMembership {
    rooms: HashMap<RoomName, HashSet<ConnectionId>>,
}

impl RoomMembership {
    pub fn join(&mut self, room: RoomName, id: ConnectionId) {
        self.rooms.entry(room).or_default().insert(id);
    }

    pub fn leave(&mut self, room: &RoomName, id: &ConnectionId) {
        if let Some(members) = self.rooms.get_mut(room) {
            members.remove(id);
            if members.is_empty() {
                self.rooms.remove(room);
            }
        }
    }

    /// Snapshot of the room's members.
    pub fn members(&self, room: &RoomName) -> HashSet<ConnectionId> {
        self.rooms.get(room).cloned().unwrap_or_default()
    }

    pub fn contains(&self, room: &RoomName, id: &ConnectionId) -> bool {
        self.rooms.get(room).is_some_and(|members| members.contains(id))
    }

    /// Non-empty rooms with their member count, sorted by room name.
    pub fn occupancy(&self) -> Vec<(RoomName, usize)> {
        let mut rooms: Vec<(RoomName, usize)> = self
            .rooms
            .iter()
            .map(|(room, members)| (room.clone(), members.len()))
            .collect();
        rooms.sort_by(|a, b| a.0.cmp(&b.0));
        rooms
    }

    fn total_memberships(&self) -> usize {
        self.rooms.values().map(HashSet::len).sum()
    }
}

/// Result of a join: the stored participant and the identity it replaced, if the
/// connection had joined before.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinOutcome {
    pub participant: Participant,
    pub previous: Option<Participant>,
}

impl JoinOutcome {
    /// The room the connection left, when the join moved it to another room.
    pub fn left_room(&self) -> Option<&RoomName> {
        self.previous
            .as_ref()
            .map(|previous| &previous.room)
            .filter(|room| **room != self.participant.room)
    }
}

/// Registry and membership index under a single owner.
#[derive(Debug, Default)]
pub struct Presence {
    registry: ConnectionRegistry,
    membership: RoomMembership,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: ConnectionId) {
        self.registry.register(id);
    }

    /// Joins (or re-joins) a registered connection to `room`.
    ///
    /// A re-join into another room drops the old membership. The typing flag
    /// starts cleared in the new identity.
    pub fn join(
        &mut self,
        id: &ConnectionId,
        display_name: DisplayName,
        room: RoomName,
        joined_at: Timestamp,
    ) -> Result<JoinOutcome, PresenceError> {
        if !self.registry.is_registered(id) {
            return Err(PresenceError::UnknownConnection(id.to_string()));
        }

        let participant = Participant::new(id.clone(), display_name, room.clone(), joined_at);
        let previous = self.registry.set_identity(participant.clone());
        if let Some(previous) = &previous {
            self.membership.leave(&previous.room, id);
        }
        self.membership.join(room, id.clone());

        debug_assert!(self.is_consistent());
        Ok(JoinOutcome {
            participant,
            previous,
        })
    }

    /// Removes the connection from the registry and from its room.
    ///
    /// Returns the participant as it was before removal, or `None` when the
    /// connection never joined (or is unknown).
    pub fn depart(&mut self, id: &ConnectionId) -> Option<Participant> {
        let participant = self.registry.remove(id)?;
        self.membership.leave(&participant.room, id);

        debug_assert!(self.is_consistent());
        Some(participant)
    }

    /// Updates the typing flag. Returns the updated participant when the flag
    /// changed and `None` when it already had that value.
    pub fn set_typing(
        &mut self,
        id: &ConnectionId,
        is_typing: bool,
    ) -> Result<Option<Participant>, PresenceError> {
        if !self.registry.is_registered(id) {
            return Err(PresenceError::UnknownConnection(id.to_string()));
        }
        let participant = self
            .registry
            .get_mut(id)
            .ok_or_else(|| PresenceError::NotJoined(id.to_string()))?;

        if participant.is_typing == is_typing {
            return Ok(None);
        }
        participant.is_typing = is_typing;
        Ok(Some(participant.clone()))
    }

    pub fn participant(&self, id: &ConnectionId) -> Option<Participant> {
        self.registry.get(id).cloned()
    }

    pub fn is_registered(&self, id: &ConnectionId) -> bool {
        self.registry.is_registered(id)
    }

    /// Every joined participant, sorted by display name then connection id.
    pub fn list_all(&self) -> Vec<Participant> {
        let mut participants = self.registry.list_all();
        participants.sort_by(|a, b| {
            a.display_name
                .cmp(&b.display_name)
                .then_with(|| a.id.cmp(&b.id))
        });
        participants
    }

    /// Snapshot of the room's members, sorted for deterministic fan-out.
    pub fn members(&self, room: &RoomName) -> Vec<ConnectionId> {
        let mut members: Vec<ConnectionId> = self.membership.members(room).into_iter().collect();
        members.sort();
        members
    }

    /// Participants of one room, sorted like [`Presence::list_all`].
    pub fn room_participants(&self, room: &RoomName) -> Vec<Participant> {
        self.list_all()
            .into_iter()
            .filter(|participant| &participant.room == room)
            .collect()
    }

    pub fn occupancy(&self) -> Vec<(RoomName, usize)> {
        self.membership.occupancy()
    }

    /// Number of live connections, joined or not.
    pub fn connection_count(&self) -> usize {
        self.registry.count()
    }

    /// `true` when every joined participant is a member of exactly the room the
    /// registry records for it and no room holds anyone else.
    pub fn is_consistent(&self) -> bool {
        let joined = self.registry.list_all();
        joined
            .iter()
            .all(|participant| self.membership.contains(&participant.room, &participant.id))
            && self.membership.total_memberships() == joined.len()
    }
}
