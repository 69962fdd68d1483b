use bytes::Bytes;
use hasp_core::{
    Error, LockerNumber, Result, Rs485Address,
    constants::{
        FRAME_ADDRESS_OFFSET, FRAME_CHECKSUM_OFFSET, FRAME_COMMAND_OPEN, FRAME_LEN,
        FRAME_LOCKER_OFFSET, FRAME_OPERAND, FRAME_PREAMBLE,
    },
};
use std::fmt;

/// CommandFrame is the bit-exact 10-byte RS485 open-locker command
///
/// # Wire Format
///
/// ```text
/// [0x5A][0x5A][0x00][address][0x00][0x04][0x00][0x01][locker][checksum]
/// ```
///
/// The checksum at byte 9 is the XOR of bytes 0-8. Building a frame is a
/// pure function of the validated address and compartment number; no I/O
/// happens here and no partially-built frame is ever observable.
///
/// # Basic Usage
///
/// ```
/// use hasp_core::{Rs485Address, LockerNumber};
/// use hasp_protocol::CommandFrame;
///
/// let address = Rs485Address::new(2).unwrap();
/// let number = LockerNumber::new(7).unwrap();
/// let frame = CommandFrame::open(address, number);
///
/// assert_eq!(
///     frame.as_bytes(),
///     &[0x5A, 0x5A, 0x00, 0x02, 0x00, 0x04, 0x00, 0x01, 0x07, 0x00]
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandFrame {
    data: [u8; FRAME_LEN],
}

impl CommandFrame {
    /// Build the open command for a compartment.
    ///
    /// Pure and total on the validated domain: the newtypes guarantee the
    /// address and number are in range, so this cannot fail.
    #[must_use]
    pub fn open(address: Rs485Address, number: LockerNumber) -> Self {
        let mut data = [
            FRAME_PREAMBLE,
            FRAME_PREAMBLE,
            0x00,
            address.as_u8(),
            0x00,
            FRAME_COMMAND_OPEN,
            0x00,
            FRAME_OPERAND,
            number.as_u8(),
            0x00,
        ];
        data[FRAME_CHECKSUM_OFFSET] = xor_checksum(&data[..FRAME_CHECKSUM_OFFSET]);
        CommandFrame { data }
    }

    /// Get the raw frame bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; FRAME_LEN] {
        &self.data
    }

    /// Copy the frame into a `Bytes` buffer for transport handoff.
    #[must_use]
    pub fn to_bytes(&self) -> Bytes {
        Bytes::copy_from_slice(&self.data)
    }

    /// Controller board address encoded in the frame.
    #[must_use]
    pub fn address(&self) -> u8 {
        self.data[FRAME_ADDRESS_OFFSET]
    }

    /// Compartment number encoded in the frame.
    #[must_use]
    pub fn locker_number(&self) -> u8 {
        self.data[FRAME_LOCKER_OFFSET]
    }

    /// Checksum byte of the frame.
    #[must_use]
    pub fn checksum(&self) -> u8 {
        self.data[FRAME_CHECKSUM_OFFSET]
    }

    /// Parse and verify a received or audited 10-byte frame.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the length, preamble, fixed bytes,
    /// address, compartment range, or checksum do not match the wire
    /// format.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != FRAME_LEN {
            return Err(Error::Validation(format!(
                "Frame must be {FRAME_LEN} bytes, got {}",
                bytes.len()
            )));
        }

        if bytes[0] != FRAME_PREAMBLE || bytes[1] != FRAME_PREAMBLE {
            return Err(Error::Validation(format!(
                "Invalid frame preamble: {:02X} {:02X}",
                bytes[0], bytes[1]
            )));
        }

        if bytes[2] != 0x00
            || bytes[4] != 0x00
            || bytes[5] != FRAME_COMMAND_OPEN
            || bytes[6] != 0x00
            || bytes[7] != FRAME_OPERAND
        {
            return Err(Error::Validation(
                "Frame fixed bytes do not match open command layout".to_string(),
            ));
        }

        // Re-validate the embedded address and compartment ranges
        Rs485Address::new(bytes[FRAME_ADDRESS_OFFSET])?;
        LockerNumber::new(bytes[FRAME_LOCKER_OFFSET])?;

        let expected = xor_checksum(&bytes[..FRAME_CHECKSUM_OFFSET]);
        let actual = bytes[FRAME_CHECKSUM_OFFSET];
        if expected != actual {
            return Err(Error::Validation(format!(
                "Checksum mismatch: expected {expected:02X}, got {actual:02X}"
            )));
        }

        let mut data = [0u8; FRAME_LEN];
        data.copy_from_slice(bytes);
        Ok(CommandFrame { data })
    }
}

impl fmt::Display for CommandFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hex: Vec<String> = self.data.iter().map(|b| format!("{:02X}", b)).collect();
        write!(
            f,
            "Frame[addr={:02}, locker={:02}, bytes={}]",
            self.address(),
            self.locker_number(),
            hex.join(" ")
        )
    }
}

/// Encode an open command from raw, unvalidated integers.
///
/// This is the boundary entry point for callers holding plain numbers
/// (e.g. a locker row loaded from the store). Validation happens before
/// any frame byte is produced, so a failure never yields a partial frame.
///
/// # Errors
/// Returns `Error::Validation` if `address` is outside 0-31 or `number`
/// is outside 1-24.
pub fn encode(address: u8, number: u8) -> Result<CommandFrame> {
    let address = Rs485Address::new(address)?;
    let number = LockerNumber::new(number)?;
    Ok(CommandFrame::open(address, number))
}

/// XOR-fold checksum over a byte slice.
fn xor_checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, &b| acc ^ b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_encode_reference_vector() {
        // addr=2, locker=7 checksums to 0x00
        let frame = encode(2, 7).unwrap();
        assert_eq!(
            frame.as_bytes(),
            &[0x5A, 0x5A, 0x00, 0x02, 0x00, 0x04, 0x00, 0x01, 0x07, 0x00]
        );
        assert_eq!(frame.checksum(), 0x00);
    }

    #[test]
    fn test_encode_accessors() {
        let frame = encode(31, 24).unwrap();
        assert_eq!(frame.address(), 31);
        assert_eq!(frame.locker_number(), 24);
        assert_eq!(frame.as_bytes().len(), FRAME_LEN);
    }

    #[rstest]
    #[case(32, 7)]
    #[case(255, 7)]
    #[case(2, 0)]
    #[case(2, 25)]
    fn test_encode_rejects_out_of_range(#[case] address: u8, #[case] number: u8) {
        assert!(encode(address, number).is_err());
    }

    #[test]
    fn test_checksum_is_xor_of_preceding_bytes() {
        let frame = encode(5, 13).unwrap();
        let bytes = frame.as_bytes();
        let expected = bytes[..9].iter().fold(0u8, |acc, &b| acc ^ b);
        assert_eq!(bytes[9], expected);
    }

    #[test]
    fn test_parse_round_trip() {
        let frame = encode(12, 3).unwrap();
        let parsed = CommandFrame::parse(frame.as_bytes()).unwrap();
        assert_eq!(parsed, frame);
    }

    #[test]
    fn test_parse_rejects_corrupted_checksum() {
        let frame = encode(12, 3).unwrap();
        let mut bytes = *frame.as_bytes();
        bytes[9] ^= 0xFF;

        let result = CommandFrame::parse(&bytes);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_rejects_bad_preamble() {
        let frame = encode(1, 1).unwrap();
        let mut bytes = *frame.as_bytes();
        bytes[0] = 0xA5;
        // Keep checksum consistent so only the preamble check can fire
        bytes[9] = bytes[..9].iter().fold(0u8, |acc, &b| acc ^ b);

        assert!(CommandFrame::parse(&bytes).is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(CommandFrame::parse(&[0x5A; 9]).is_err());
        assert!(CommandFrame::parse(&[0x5A; 11]).is_err());
    }

    #[test]
    fn test_to_bytes_matches_array() {
        let frame = encode(2, 7).unwrap();
        assert_eq!(&frame.to_bytes()[..], frame.as_bytes());
    }

    #[test]
    fn test_display_renders_hex() {
        let frame = encode(2, 7).unwrap();
        let display = format!("{}", frame);
        assert!(display.contains("addr=02"));
        assert!(display.contains("locker=07"));
        assert!(display.contains("5A 5A"));
    }
}
