/// 8-bit CRC over a group of data bytes, MSB first, no reflection and no final XOR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Crc8 {
    polynomial: u8,
    init: u8,
}

// https://sensirion.com/media/documents/296373BB/6203C5DF/Sensirion_Gas_Sensors_Datasheet_SGP40.pdf
// Section 4.6
pub const SENSIRION: Crc8 = Crc8::new(0x31, 0xff);

impl Crc8 {
    pub const fn new(polynomial: u8, init: u8) -> Self {
        Self { polynomial, init }
    }

    pub const fn polynomial(&self) -> u8 {
        self.polynomial
    }

    pub const fn init(&self) -> u8 {
        self.init
    }

    pub fn compute(&self, data: &[u8]) -> u8 {
        let mut crc = self.init;

        for byte in data {
            crc ^= byte;

            for _ in 0..8 {
                if crc & 0x80 != 0 {
                    crc = (crc << 1) ^ self.polynomial;
                } else {
                    crc <<= 1;
                }
            }
        }

        crc
    }

    pub fn verify(&self, data: &[u8], expected: u8) -> bool {
        self.compute(data) == expected
    }
}

#[cfg(test)]
mod tests {
    use super::{Crc8, SENSIRION};

    #[test]
    fn test_crc() {
        assert_eq!(SENSIRION.compute(&[0xbe, 0xef]), 0x92);
        assert!(SENSIRION.verify(&[0xbe, 0xef], 0x92));
        assert!(!SENSIRION.verify(&[0xbe, 0x01], 0x92));
    }

    #[test]
    fn test_check_value() {
        assert_eq!(SENSIRION.compute(b"123456789"), 0xf7);
        assert_eq!(SENSIRION.compute(&[0x00, 0x00]), 0x81);
        assert_eq!(SENSIRION.compute(&[]), 0xff);
    }

    #[test]
    fn test_no_state_between_calls() {
        let first = SENSIRION.compute(&[0x01, 0xf4]);
        SENSIRION.compute(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(SENSIRION.compute(&[0x01, 0xf4]), first);
        assert_eq!(first, 0x33);
    }

    #[test]
    fn test_matches_crc_catalog() {
        let reference = crc::Crc::<u8>::new(&crc::CRC_8_NRSC_5);
        for a in 0..=u8::MAX {
            for b in [0x00, 0x01, 0x7f, 0x80, 0xfe, 0xff] {
                assert_eq!(SENSIRION.compute(&[a, b]), reference.checksum(&[a, b]));
            }
            assert_eq!(SENSIRION.compute(&[a]), reference.checksum(&[a]));
        }
    }

    #[test]
    fn test_single_bit_errors_detected() {
        let groups: [&[u8]; 4] = [&[0x00], &[0x12, 0x34], &[0xff, 0xff], &[0x01, 0xf4]];

        for data in groups {
            let crc = SENSIRION.compute(data);
            assert!(SENSIRION.verify(data, crc));

            for bit in 0..data.len() * 8 {
                let mut corrupted = [0u8; 2];
                corrupted[..data.len()].copy_from_slice(data);
                corrupted[bit / 8] ^= 1 << (bit % 8);
                assert!(!SENSIRION.verify(&corrupted[..data.len()], crc));
            }

            for bit in 0..8 {
                assert!(!SENSIRION.verify(data, crc ^ (1 << bit)));
            }
        }
    }

    #[test]
    fn test_custom_parameters() {
        let crc = Crc8::new(0x07, 0x00);
        assert_eq!(crc.polynomial(), 0x07);
        assert_eq!(crc.init(), 0x00);
        // CRC-8/SMBUS check value
        assert_eq!(crc.compute(b"123456789"), 0xf4);
    }
}
