//! Statisch vorallokierter Suchraum für die Pfadsuche.
//!
//! Alle Zustände werden bei der Konstruktion einmalig angelegt. Während der
//! Suche wird nie allokiert; Zustände werden über ihren Index adressiert.
//!
//! Neben dem schnellen, ungeprüften Rückweg Zustand → Index (`index_of`)
//! gibt es die geprüfte Variante `checked_index_of` und den Handle-Typ
//! [`StateIndex`], mit dem der Rückweg gar nicht erst nötig ist.

use thiserror::Error;

/// Fehler beim Zugriff auf den Suchraum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SearchSpaceError {
    /// Index liegt außerhalb des Suchraums
    #[error("Suchraum-Index {index} ausserhalb des Bereichs (Groesse {len})")]
    IndexOutOfBounds {
        /// Angefragter Index
        index: usize,
        /// Anzahl Zustände im Suchraum
        len: usize,
    },
}

/// Handle auf einen Zustand in einem [`StaticSearchSpace`].
///
/// Wird ausschließlich vom Suchraum selbst erzeugt und ist nur für diesen gültig.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateIndex(usize);

impl StateIndex {
    /// Roher Index in das Zustands-Array
    pub fn get(self) -> usize {
        self.0
    }
}

/// Suchraum fester Größe mit exklusiv besessenem Zustands-Array
#[derive(Debug, Clone)]
pub struct StaticSearchSpace<S> {
    states: Box<[S]>,
}

impl<S: Default> StaticSearchSpace<S> {
    /// Legt `num_states` Default-Zustände an. Die Größe ändert sich danach nie.
    pub fn new(num_states: usize) -> Self {
        let states: Box<[S]> = std::iter::repeat_with(S::default)
            .take(num_states)
            .collect();
        log::debug!(
            "Suchraum angelegt: {} Zustaende, {} Bytes",
            num_states,
            num_states * std::mem::size_of::<S>()
        );
        Self { states }
    }

    /// Setzt alle Zustände auf `S::default()` zurück, ohne neu zu allokieren
    pub fn reset(&mut self) {
        for state in self.states.iter_mut() {
            *state = S::default();
        }
    }
}

impl<S> StaticSearchSpace<S> {
    /// Anzahl der Zustände
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// `true` bei einem Suchraum ohne Zustände
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Zustand an Position `index`
    pub fn state(&self, index: usize) -> Result<&S, SearchSpaceError> {
        let len = self.states.len();
        self.states
            .get(index)
            .ok_or(SearchSpaceError::IndexOutOfBounds { index, len })
    }

    /// Mutable Zustand an Position `index`
    pub fn state_mut(&mut self, index: usize) -> Result<&mut S, SearchSpaceError> {
        let len = self.states.len();
        self.states
            .get_mut(index)
            .ok_or(SearchSpaceError::IndexOutOfBounds { index, len })
    }

    /// Index eines Zustands per Adressdifferenz zum Array-Anfang.
    ///
    /// Ungeprüft: `state` muss aus genau diesem Suchraum stammen. Für jeden
    /// anderen Zustand ist das Ergebnis bedeutungslos (aber kein UB).
    /// Bei Zustandstypen der Größe 0 ist das Ergebnis immer 0.
    #[inline]
    pub fn index_of(&self, state: &S) -> usize {
        let size = std::mem::size_of::<S>();
        if size == 0 {
            return 0;
        }
        let base = self.states.as_ptr() as usize;
        let address = state as *const S as usize;
        address.wrapping_sub(base) / size
    }

    /// Geprüfte Variante von [`index_of`](Self::index_of).
    ///
    /// `None`, wenn `state` nicht zu diesem Suchraum gehört.
    pub fn checked_index_of(&self, state: &S) -> Option<StateIndex> {
        let size = std::mem::size_of::<S>();
        if size == 0 {
            return (self.states.len() == 1).then_some(StateIndex(0));
        }
        let base = self.states.as_ptr() as usize;
        let address = state as *const S as usize;
        let offset = address.checked_sub(base)?;
        if offset % size != 0 {
            return None;
        }
        let index = offset / size;
        (index < self.states.len()).then_some(StateIndex(index))
    }

    /// Erzeugt ein geprüftes Handle für `index`
    pub fn handle(&self, index: usize) -> Result<StateIndex, SearchSpaceError> {
        if index < self.states.len() {
            Ok(StateIndex(index))
        } else {
            Err(SearchSpaceError::IndexOutOfBounds {
                index,
                len: self.states.len(),
            })
        }
    }

    /// Zustand zu einem Handle
    pub fn get(&self, handle: StateIndex) -> Option<&S> {
        self.states.get(handle.0)
    }

    /// Mutable Zustand zu einem Handle
    pub fn get_mut(&mut self, handle: StateIndex) -> Option<&mut S> {
        self.states.get_mut(handle.0)
    }

    /// Iterator über alle Zustände mit ihrem Handle
    pub fn iter(&self) -> impl Iterator<Item = (StateIndex, &S)> {
        self.states
            .iter()
            .enumerate()
            .map(|(i, s)| (StateIndex(i), s))
    }
}
