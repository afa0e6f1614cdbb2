pub const WOL_PORT: u16 = 9;
pub const SYNC_STREAM: [u8; 6] = [ 0xff, 0xff, 0xff, 0xff, 0xff, 0xff ];
pub const MAC_REPETITIONS: usize = 16;
pub const MAGIC_PACKET_LEN: usize = SYNC_STREAM.len() + MAC_REPETITIONS * 6;
