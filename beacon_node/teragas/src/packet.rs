use bandwidth::ChainId;

/// Unit of work flowing through the teragas pipeline (§4.12).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TpDataPacket {
    pub chain_id: ChainId,
    pub data: Vec<u8>,
    pub chunk_index: u32,
    pub total_chunks: u32,
    pub is_chunked: bool,
    pub compressed: bool,
    pub orig_size: usize,
    pub timestamp_nanos: u64,
}

impl TpDataPacket {
    pub fn new(chain_id: ChainId, data: Vec<u8>, timestamp_nanos: u64) -> Self {
        let orig_size = data.len();
        Self {
            chain_id,
            data,
            chunk_index: 0,
            total_chunks: 1,
            is_chunked: false,
            compressed: false,
            orig_size,
            timestamp_nanos,
        }
    }
}
