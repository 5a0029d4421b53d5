//! Packet and section builders shared by the unit tests.

use crate::crc32::mpeg2_crc32;

/// Initialize tracing for tests with appropriate settings
#[inline]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// 188-byte packet with payload only, padded with 0xFF.
pub fn ts_packet(pid: u16, payload_unit_start_indicator: bool, cc: u8, payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= 184);
    let mut packet = vec![0xFFu8; 188];
    packet[0] = 0x47;
    packet[1] = ((pid >> 8) & 0x1F) as u8;
    if payload_unit_start_indicator {
        packet[1] |= 0x40;
    }
    packet[2] = (pid & 0xFF) as u8;
    packet[3] = 0x10 | (cc & 0x0F);
    packet[4..4 + payload.len()].copy_from_slice(payload);
    packet
}

/// Prefix a transport packet with a zero arrival timestamp.
pub fn m2ts_unit(ts_packet: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(192);
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x00]);
    out.extend_from_slice(ts_packet);
    out
}

/// Section payload as carried in the first packet: pointer field then section.
pub fn with_pointer(section: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(section.len() + 1);
    payload.push(0x00);
    payload.extend_from_slice(section);
    payload
}

fn finish_section(mut section: Vec<u8>) -> Vec<u8> {
    let section_length = section.len() - 3 + 4;
    section[1] = 0xB0 | ((section_length >> 8) as u8 & 0x0F);
    section[2] = (section_length & 0xFF) as u8;
    let crc = mpeg2_crc32(&section);
    section.extend_from_slice(&crc.to_be_bytes());
    section
}

/// PAT section with a valid CRC for `(program_number, pmt_pid)` entries.
pub fn pat_section(programs: &[(u16, u16)]) -> Vec<u8> {
    let mut section = vec![0x00, 0x00, 0x00, 0x00, 0x01, 0xC1, 0x00, 0x00];
    for &(program_number, pmt_pid) in programs {
        section.extend_from_slice(&program_number.to_be_bytes());
        section.push(0xE0 | ((pmt_pid >> 8) as u8 & 0x1F));
        section.push((pmt_pid & 0xFF) as u8);
    }
    finish_section(section)
}

/// PMT section with a valid CRC for `(stream_type, elementary_pid, es_info)` entries.
pub fn pmt_section(program_number: u16, streams: &[(u8, u16, &[u8])]) -> Vec<u8> {
    let mut section = vec![0x02, 0x00, 0x00];
    section.extend_from_slice(&program_number.to_be_bytes());
    section.extend_from_slice(&[0xC1, 0x00, 0x00]);
    // PCR PID 0x1FFF, no program info
    section.extend_from_slice(&[0xFF, 0xFF, 0xF0, 0x00]);
    for &(stream_type, pid, es_info) in streams {
        section.push(stream_type);
        section.push(0xE0 | ((pid >> 8) as u8 & 0x1F));
        section.push((pid & 0xFF) as u8);
        section.push(0xF0 | ((es_info.len() >> 8) as u8 & 0x0F));
        section.push((es_info.len() & 0xFF) as u8);
        section.extend_from_slice(es_info);
    }
    finish_section(section)
}

/// Minimal PES packet with a PTS and the given elementary data.
pub fn pes_packet(stream_id: u8, pts: u64, data: &[u8]) -> Vec<u8> {
    let mut pes = vec![0x00, 0x00, 0x01, stream_id];
    let pes_packet_length = 3 + 5 + data.len();
    pes.extend_from_slice(&(pes_packet_length as u16).to_be_bytes());
    pes.extend_from_slice(&[0x80, 0x80, 0x05]);
    pes.push(0x21 | (((pts >> 30) as u8 & 0x07) << 1));
    pes.push((pts >> 22) as u8);
    pes.push((((pts >> 15) as u8) << 1) | 0x01);
    pes.push((pts >> 7) as u8);
    pes.push(((pts as u8) << 1) | 0x01);
    pes.extend_from_slice(data);
    pes
}
