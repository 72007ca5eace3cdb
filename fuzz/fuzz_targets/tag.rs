#![no_main]

use std::fs;
use std::io::Write;
use std::path::Path;

use libfuzzer_sys::fuzz_target;

const PATH: &str = "/tmp/id3kit-fuzz.mp3";

fuzz_target!(|data: &[u8]| {
    let path = Path::new(PATH);
    let mut file = fs::File::create(path).unwrap();
    file.write_all(data).unwrap();
    let _ = id3kit::read_tag(path);
});
