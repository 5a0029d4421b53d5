/// Program Clock Reference: 33-bit base at 90 kHz plus 9-bit extension at 27 MHz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pcr {
    pub base: u64,
    pub extension: u16,
}

impl Pcr {
    /// Parse a PCR from its 6-byte encoding.
    ///
    /// Layout: `[base32..25][base24..17][base16..9][base8..1][base0 | reserved(6) | ext_high][ext_low]`
    pub fn parse(data: &[u8]) -> Option<Self> {
        let data = data.get(..6)?;
        let base = ((data[0] as u64) << 25)
            | ((data[1] as u64) << 17)
            | ((data[2] as u64) << 9)
            | ((data[3] as u64) << 1)
            | ((data[4] as u64) >> 7);
        let extension = (((data[4] & 0x01) as u16) << 8) | data[5] as u16;
        Some(Pcr { base, extension })
    }

    /// Full PCR value at 27 MHz resolution.
    pub fn as_27mhz(&self) -> u64 {
        self.base * 300 + self.extension as u64
    }
}

/// Borrowed view of an adaptation field body (the bytes after its length).
#[derive(Debug, Clone, Copy)]
pub struct AdaptationField<'a> {
    data: &'a [u8],
    pub discontinuity_indicator: bool,
    pub random_access_indicator: bool,
}

impl<'a> AdaptationField<'a> {
    /// Returns `None` for an empty body, which carries no flags.
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        let flags = *data.first()?;
        Some(AdaptationField {
            data,
            discontinuity_indicator: (flags & 0x80) != 0,
            random_access_indicator: (flags & 0x40) != 0,
        })
    }

    /// PCR, if flagged and fully present.
    pub fn pcr(&self) -> Option<Pcr> {
        if self.data[0] & 0x10 == 0 {
            return None;
        }
        Pcr::parse(&self.data[1..])
    }
}
