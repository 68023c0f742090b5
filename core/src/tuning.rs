use crate::error::BridgeError;

/// Number of entries in the tuning table, one per MIDI key.
pub const TUNING_KEYS: usize = 128;

/// Largest tuning offset the engine can express through the pitch wheel,
/// in semitones. Larger requests are clamped.
pub const PITCH_BEND_RANGE: f64 = 2.0;

/// Per-key tuning offsets in semitones, shared across all sessions.
///
/// Entries default to 0.0 (equal temperament). Writes are bounds-checked;
/// reads outside the key range return the neutral offset.
#[derive(Debug, Clone)]
pub struct TuningTable {
    offsets: [f64; TUNING_KEYS],
}

impl TuningTable {
    pub fn new() -> Self {
        Self {
            offsets: [0.0; TUNING_KEYS],
        }
    }

    /// Stores a tuning offset for `key`, clamped to the pitch wheel range.
    pub fn set(&mut self, key: u8, semitones: f64) -> Result<(), BridgeError> {
        if key as usize >= TUNING_KEYS {
            return Err(BridgeError::KeyOutOfRange(key));
        }
        if !semitones.is_finite() {
            return Err(BridgeError::InvalidTuning(semitones));
        }

        let clamped = semitones.clamp(-PITCH_BEND_RANGE, PITCH_BEND_RANGE);
        if clamped != semitones {
            log::warn!(
                "tuning offset {} for key {} clamped to {}",
                semitones,
                key,
                clamped
            );
        }

        self.offsets[key as usize] = clamped;
        Ok(())
    }

    /// Returns the stored offset for `key`, or 0.0 if the key is out of range.
    pub fn get(&self, key: u8) -> f64 {
        self.offsets
            .get(key as usize)
            .copied()
            .unwrap_or_default()
    }
}

impl Default for TuningTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_reads_offsets() {
        let mut table = TuningTable::new();
        table.set(60, 0.5).unwrap();
        assert_eq!(table.get(60), 0.5);
        assert_eq!(table.get(61), 0.0);
    }

    #[test]
    fn rejects_out_of_range_key() {
        let mut table = TuningTable::new();
        assert!(matches!(
            table.set(128, 0.5),
            Err(BridgeError::KeyOutOfRange(128))
        ));
        assert_eq!(table.get(128), 0.0);
    }

    #[test]
    fn rejects_non_finite_offsets() {
        let mut table = TuningTable::new();
        assert!(matches!(
            table.set(60, f64::NAN),
            Err(BridgeError::InvalidTuning(_))
        ));
        assert!(matches!(
            table.set(60, f64::INFINITY),
            Err(BridgeError::InvalidTuning(_))
        ));
        assert_eq!(table.get(60), 0.0);
    }

    #[test]
    fn clamps_to_pitch_bend_range() {
        let mut table = TuningTable::new();
        table.set(10, 3.5).unwrap();
        assert_eq!(table.get(10), PITCH_BEND_RANGE);
        table.set(10, -12.0).unwrap();
        assert_eq!(table.get(10), -PITCH_BEND_RANGE);
    }
}
