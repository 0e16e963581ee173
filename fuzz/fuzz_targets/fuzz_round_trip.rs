#![no_main]
use libfuzzer_sys::fuzz_target;
use pdx_escape::{DiagnosticKind, Format};

fuzz_target!(|data: &[u8]| {
    let text = match std::str::from_utf8(data) {
        Ok(x) => x,
        Err(_) => return,
    };

    for format in Format::ALL.iter() {
        // raw C1 controls come back as their windows-1252 characters
        if text.chars().any(|c| ('\u{80}'..='\u{9f}').contains(&c)) {
            continue;
        }

        let encoded = format.encode(text);
        if encoded
            .diagnostics
            .iter()
            .any(|x| x.kind == DiagnosticKind::MarkerCollision)
        {
            continue;
        }

        let expected = text
            .chars()
            .filter(|&c| c != '\0' && u32::from(c) <= 0xffff)
            .collect::<String>();

        let data = format.to_vec(text).unwrap();
        assert_eq!(format.from_slice(&data).unwrap(), expected);
    }
});
