//! Seat identification and per-seat data storage.
//!
//! ## PlayerId
//!
//! Internal seat index. Turn order, dealer rotation and May-I priority are all
//! arithmetic over seats; external (transport) ids are bound to seats in the
//! snapshot, never here.
//!
//! ## PlayerMap
//!
//! Per-seat storage backed by `Vec` for O(1) access, indexable by `PlayerId`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Seat index, 0-based in turn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub u8);

impl PlayerId {
    /// Create a new player ID.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Get the raw seat index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over all seats of a table with `player_count` players.
    ///
    /// ```
    /// use may_i::core::PlayerId;
    ///
    /// let players: Vec<_> = PlayerId::all(4).collect();
    /// assert_eq!(players.len(), 4);
    /// assert_eq!(players[3], PlayerId::new(3));
    /// ```
    pub fn all(player_count: usize) -> impl Iterator<Item = PlayerId> {
        (0..player_count as u8).map(PlayerId)
    }

    /// The seat `steps` places clockwise from this one.
    #[must_use]
    pub fn offset(self, steps: usize, player_count: usize) -> PlayerId {
        PlayerId(((self.index() + steps) % player_count) as u8)
    }

    /// The next seat clockwise.
    #[must_use]
    pub fn next(self, player_count: usize) -> PlayerId {
        self.offset(1, player_count)
    }

    /// Seats strictly between `self` and `until`, clockwise, wrapping around.
    ///
    /// ```
    /// use may_i::core::PlayerId;
    ///
    /// let between: Vec<_> = PlayerId::new(3).seats_between(PlayerId::new(1), 5).collect();
    /// assert_eq!(between, vec![PlayerId::new(4), PlayerId::new(0)]);
    /// ```
    pub fn seats_between(self, until: PlayerId, player_count: usize) -> impl Iterator<Item = PlayerId> {
        let distance = (until.index() + player_count - self.index()) % player_count;
        (1..distance).map(move |step| self.offset(step, player_count))
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Seat {}", self.0)
    }
}

/// Per-seat data storage with O(1) access.
///
/// ## Example
///
/// ```
/// use may_i::core::{PlayerId, PlayerMap};
///
/// let mut scores: PlayerMap<i32> = PlayerMap::with_value(4, 0);
/// scores[PlayerId::new(1)] += 15;
/// assert_eq!(scores[PlayerId::new(1)], 15);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerMap<T> {
    data: Vec<T>,
}

impl<T> PlayerMap<T> {
    /// Create a new PlayerMap with values from a factory function.
    pub fn new(player_count: usize, factory: impl Fn(PlayerId) -> T) -> Self {
        let data = (0..player_count.min(u8::MAX as usize) as u8)
            .map(|i| factory(PlayerId(i)))
            .collect();

        Self { data }
    }

    /// Create a new PlayerMap with all entries set to the same value.
    pub fn with_value(player_count: usize, value: T) -> Self
    where
        T: Clone,
    {
        Self::new(player_count, |_| value.clone())
    }

    /// Create a new PlayerMap with default values.
    pub fn with_default(player_count: usize) -> Self
    where
        T: Default,
    {
        Self::new(player_count, |_| T::default())
    }

    /// Build from per-seat values in seat order.
    #[must_use]
    pub fn from_vec(data: Vec<T>) -> Self {
        Self { data }
    }

    /// Get the number of seats.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.data.len()
    }

    /// Get a seat's data, or `None` if the seat doesn't exist.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> Option<&T> {
        self.data.get(player.index())
    }

    /// Get a mutable reference to a seat's data.
    pub fn get_mut(&mut self, player: PlayerId) -> Option<&mut T> {
        self.data.get_mut(player.index())
    }

    /// Iterate over (PlayerId, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.data
            .iter()
            .enumerate()
            .map(|(i, v)| (PlayerId(i as u8), v))
    }

    /// Iterate over the values in seat order.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.data.iter()
    }
}

impl<T> Index<PlayerId> for PlayerMap<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        &self.data[player.index()]
    }
}

impl<T> IndexMut<PlayerId> for PlayerMap<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        &mut self.data[player.index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_basics() {
        let p0 = PlayerId::new(0);
        let p1 = PlayerId::new(1);

        assert_eq!(p0.index(), 0);
        assert_eq!(p1.index(), 1);
        assert_eq!(format!("{}", p0), "Seat 0");
    }

    #[test]
    fn test_next_wraps() {
        assert_eq!(PlayerId::new(2).next(3), PlayerId::new(0));
        assert_eq!(PlayerId::new(0).next(3), PlayerId::new(1));
        assert_eq!(PlayerId::new(5).offset(4, 8), PlayerId::new(1));
    }

    #[test]
    fn test_seats_between() {
        let between: Vec<_> = PlayerId::new(0).seats_between(PlayerId::new(3), 5).collect();
        assert_eq!(between, vec![PlayerId::new(1), PlayerId::new(2)]);

        // Adjacent seats have nobody between them.
        assert_eq!(PlayerId::new(1).seats_between(PlayerId::new(2), 4).count(), 0);

        // Wrap-around
        let wrapped: Vec<_> = PlayerId::new(2).seats_between(PlayerId::new(1), 4).collect();
        assert_eq!(wrapped, vec![PlayerId::new(3), PlayerId::new(0)]);
    }

    #[test]
    fn test_player_map_new() {
        let map: PlayerMap<i32> = PlayerMap::new(4, |p| p.index() as i32 * 10);

        assert_eq!(map[PlayerId::new(0)], 0);
        assert_eq!(map[PlayerId::new(3)], 30);
        assert_eq!(map.player_count(), 4);
    }

    #[test]
    fn test_player_map_get_out_of_range() {
        let map: PlayerMap<i32> = PlayerMap::with_value(3, 7);
        assert_eq!(map.get(PlayerId::new(2)), Some(&7));
        assert_eq!(map.get(PlayerId::new(3)), None);
    }

    #[test]
    fn test_player_map_iter() {
        let map: PlayerMap<i32> = PlayerMap::new(3, |p| p.index() as i32);

        let pairs: Vec<_> = map.iter().collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[2], (PlayerId::new(2), &2));
    }

    #[test]
    fn test_player_map_serialization() {
        let map: PlayerMap<i32> = PlayerMap::new(2, |p| p.index() as i32 + 1);
        let json = serde_json::to_string(&map).unwrap();
        let deserialized: PlayerMap<i32> = serde_json::from_str(&json).unwrap();
        assert_eq!(map, deserialized);
    }
}
