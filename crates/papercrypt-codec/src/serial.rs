//! Human-facing serial numbers

use rand::Rng;

/// Serial alphabet without look-alikes (no 0/O, 1/I/L)
const ALPHABET: &[u8] = b"ABCDEFGHJKMNPQRSTUVWXYZ23456789";

pub const SERIAL_LENGTH: usize = 6;

/// Generate a random serial such as `K7PX2M`.
pub fn generate_serial() -> String {
    let mut rng = rand::thread_rng();
    (0..SERIAL_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_shape() {
        let serial = generate_serial();
        assert_eq!(serial.len(), SERIAL_LENGTH);
        assert!(serial.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn serials_avoid_look_alikes() {
        for _ in 0..200 {
            let serial = generate_serial();
            assert!(!serial.contains(&['0', 'O', '1', 'I', 'L'][..]));
        }
    }
}
