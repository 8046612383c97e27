#![no_main]

use libfuzzer_sys::fuzz_target;
use ironscope::tokenizer::{Tokenizer, TokenizerConfig};

fuzz_target!(|data: &[u8]| {
    let tokens = Tokenizer::from_bytes(data, TokenizerConfig::ide()).count();
    assert!(tokens > 0);
});
