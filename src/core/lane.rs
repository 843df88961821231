//! Repräsentiert eine Fahrspur zwischen zwei Lane-Nodes.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Befahrbarkeitsrichtung einer Lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneDirection {
    /// Nur von `start_id` nach `end_id`
    Regular,
    /// In beide Richtungen
    #[default]
    Dual,
    /// Nur von `end_id` nach `start_id`
    Reverse,
}

impl LaneDirection {
    /// Kodierung im Binärformat
    pub fn to_u8(self) -> u8 {
        match self {
            LaneDirection::Regular => 0,
            LaneDirection::Dual => 1,
            LaneDirection::Reverse => 2,
        }
    }

    /// Dekodierung aus dem Binärformat
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(LaneDirection::Regular),
            1 => Some(LaneDirection::Dual),
            2 => Some(LaneDirection::Reverse),
            _ => None,
        }
    }

    /// Darf die Lane von `start_id` nach `end_id` befahren werden?
    pub fn allows_forward(self) -> bool {
        matches!(self, LaneDirection::Regular | LaneDirection::Dual)
    }

    /// Darf die Lane von `end_id` nach `start_id` befahren werden?
    pub fn allows_backward(self) -> bool {
        matches!(self, LaneDirection::Reverse | LaneDirection::Dual)
    }
}

/// Bitmaske der Lane-Eigenschaften
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LaneFlags(u32);

impl LaneFlags {
    /// Keine Eigenschaften
    pub const NONE: Self = Self(0);
    /// Für Fahrzeuge befahrbar
    pub const VEHICLE: Self = Self(1 << 0);
    /// Für Fußgänger begehbar
    pub const PEDESTRIAN: Self = Self(1 << 1);
    /// Gesperrt (wird von der Pfadsuche nie benutzt)
    pub const BLOCKED: Self = Self(1 << 2);
    /// Verbindungsspur einer Straßenkreuzung
    pub const CROSSING: Self = Self(1 << 3);
    /// Nur für Einsatzfahrzeuge
    pub const EMERGENCY_ONLY: Self = Self(1 << 4);

    /// Alle bekannten Bits
    pub const ALL: Self = Self(0b1_1111);
    /// Bits, die Formatversionen <= 2 kennen
    pub const LEGACY_MASK: Self = Self(0b11);

    /// Erzeugt Flags aus Rohbits, unbekannte Bits werden verworfen
    pub const fn from_bits_truncate(bits: u32) -> Self {
        Self(bits & Self::ALL.0)
    }

    /// Rohbits
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Alle Bits von `other` gesetzt?
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Mindestens ein gemeinsames Bit?
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Keine Bits gesetzt?
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Setzt die Bits von `other`
    pub fn insert(&mut self, other: Self) {
        self.0 |= other.0;
    }

    /// Löscht die Bits von `other`
    pub fn remove(&mut self, other: Self) {
        self.0 &= !other.0;
    }

    /// Schnittmenge
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }
}

impl BitOr for LaneFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for LaneFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for LaneFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(LaneFlags, &str); 5] = [
            (LaneFlags::VEHICLE, "VEHICLE"),
            (LaneFlags::PEDESTRIAN, "PEDESTRIAN"),
            (LaneFlags::BLOCKED, "BLOCKED"),
            (LaneFlags::CROSSING, "CROSSING"),
            (LaneFlags::EMERGENCY_ONLY, "EMERGENCY_ONLY"),
        ];
        let names: Vec<&str> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if names.is_empty() {
            write!(f, "LaneFlags(NONE)")
        } else {
            write!(f, "LaneFlags({})", names.join(" | "))
        }
    }
}

/// Eine Fahrspur zwischen zwei Lane-Nodes
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    /// Lane-ID
    pub id: u64,
    /// Start-Node-ID
    pub start_id: u64,
    /// End-Node-ID
    pub end_id: u64,
    /// Befahrbarkeitsrichtung
    pub direction: LaneDirection,
    /// Eigenschaften
    pub flags: LaneFlags,
    /// Nutzbare Breite in Welteinheiten
    pub width: f32,
    /// Länge (aus den Node-Positionen abgeleitet)
    pub length: f32,
}

impl Lane {
    /// Erstellt eine neue Lane
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: u64,
        start_id: u64,
        end_id: u64,
        direction: LaneDirection,
        flags: LaneFlags,
        width: f32,
        start_pos: Vec2,
        end_pos: Vec2,
    ) -> Self {
        Self {
            id,
            start_id,
            end_id,
            direction,
            flags,
            width,
            length: start_pos.distance(end_pos),
        }
    }

    /// Aktualisiert die Länge auf Basis der Node-Positionen
    pub fn update_geometry(&mut self, start_pos: Vec2, end_pos: Vec2) {
        self.length = start_pos.distance(end_pos);
    }

    /// Prüft ob die Lane den Node berührt
    pub fn touches(&self, node_id: u64) -> bool {
        self.start_id == node_id || self.end_id == node_id
    }

    /// Gegenüberliegender Node, falls `node_id` ein Endpunkt ist
    pub fn other_end(&self, node_id: u64) -> Option<u64> {
        if self.start_id == node_id {
            Some(self.end_id)
        } else if self.end_id == node_id {
            Some(self.start_id)
        } else {
            None
        }
    }

    /// Darf die Lane von `from` aus betreten werden?
    pub fn is_traversable_from(&self, from: u64) -> bool {
        if from == self.start_id {
            self.direction.allows_forward()
        } else if from == self.end_id {
            self.direction.allows_backward()
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_length_follows_geometry() {
        let mut lane = Lane::new(
            1,
            1,
            2,
            LaneDirection::Dual,
            LaneFlags::VEHICLE,
            3.0,
            Vec2::ZERO,
            Vec2::new(3.0, 4.0),
        );
        assert_eq!(lane.length, 5.0);

        lane.update_geometry(Vec2::ZERO, Vec2::new(0.0, 2.0));
        assert_eq!(lane.length, 2.0);
    }

    #[test]
    fn test_direction_traversal() {
        let lane = Lane::new(
            7,
            1,
            2,
            LaneDirection::Regular,
            LaneFlags::VEHICLE,
            3.0,
            Vec2::ZERO,
            Vec2::X,
        );
        assert!(lane.is_traversable_from(1));
        assert!(!lane.is_traversable_from(2));
        assert!(!lane.is_traversable_from(3));
        assert_eq!(lane.other_end(2), Some(1));
        assert_eq!(lane.other_end(9), None);
    }

    #[test]
    fn test_direction_byte_codes() {
        for dir in [LaneDirection::Regular, LaneDirection::Dual, LaneDirection::Reverse] {
            assert_eq!(LaneDirection::from_u8(dir.to_u8()), Some(dir));
        }
        assert_eq!(LaneDirection::from_u8(3), None);
    }

    #[test]
    fn test_flags_truncate_and_debug() {
        let flags = LaneFlags::from_bits_truncate(0xFFFF_FFFF);
        assert_eq!(flags, LaneFlags::ALL);

        let mut flags = LaneFlags::VEHICLE | LaneFlags::BLOCKED;
        assert!(flags.contains(LaneFlags::BLOCKED));
        flags.remove(LaneFlags::BLOCKED);
        assert_eq!(format!("{flags:?}"), "LaneFlags(VEHICLE)");
        assert_eq!(format!("{:?}", LaneFlags::NONE), "LaneFlags(NONE)");
    }
}
