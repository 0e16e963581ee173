const fn create_windows_1252_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0usize;
    while i < 256 {
        let c = match i {
            128 => 0x20ac,
            130 => 0x201a,
            131 => 0x0192,
            132 => 0x201e,
            133 => 0x2026,
            134 => 0x2020,
            135 => 0x2021,
            136 => 0x02c6,
            137 => 0x2030,
            138 => 0x0160,
            139 => 0x2039,
            140 => 0x0152,
            142 => 0x017d,
            145 => 0x2018,
            146 => 0x2019,
            147 => 0x201c,
            148 => 0x201d,
            149 => 0x2022,
            150 => 0x2013,
            151 => 0x2014,
            152 => 0x02dc,
            153 => 0x2122,
            154 => 0x0161,
            155 => 0x203a,
            156 => 0x0153,
            158 => 0x017e,
            159 => 0x0178,

            // 0x81, 0x8d, 0x8f, 0x90 and 0x9d are unused and map to the C1
            // control codes like everything else outside the block
            i => i as u32,
        };
        table[i] = c;
        i += 1;
    }
    table
}

/// Codepoint for every windows-1252 byte
pub(crate) static WINDOWS_1252: [u32; 256] = create_windows_1252_table();

/// Inverse of the 0x80 - 0x9f block of [`WINDOWS_1252`], sorted by codepoint
/// so that it can be binary searched.
pub(crate) static WINDOWS_1252_REVERSE: [(u32, u8); 27] = [
    (0x0152, 0x8c),
    (0x0153, 0x9c),
    (0x0160, 0x8a),
    (0x0161, 0x9a),
    (0x0178, 0x9f),
    (0x017d, 0x8e),
    (0x017e, 0x9e),
    (0x0192, 0x83),
    (0x02c6, 0x88),
    (0x02dc, 0x98),
    (0x2013, 0x96),
    (0x2014, 0x97),
    (0x2018, 0x91),
    (0x2019, 0x92),
    (0x201a, 0x82),
    (0x201c, 0x93),
    (0x201d, 0x94),
    (0x201e, 0x84),
    (0x2020, 0x86),
    (0x2021, 0x87),
    (0x2022, 0x95),
    (0x2026, 0x85),
    (0x2030, 0x89),
    (0x2039, 0x8b),
    (0x203a, 0x9b),
    (0x20ac, 0x80),
    (0x2122, 0x99),
];

const fn create_escape_target_table(targets: &[u8]) -> [bool; 256] {
    let mut table = [false; 256];
    let mut i = 0usize;
    while i < targets.len() {
        table[targets[i] as usize] = true;
        i += 1;
    }
    table
}

const EU4_TARGETS: [u8; 22] = [
    0xa4, // ¤
    0xa3, // £
    0xa7, // §
    b'$',
    b'[',
    b']',
    0x00,
    b'\\',
    b' ',
    b'\r',
    b'\n',
    b'"',
    b'/',
    b'{',
    b'}',
    b'@',
    b';',
    0x80,
    0x7e,
    0xbd, // ½
    b'_',
    b'#', // yml comment
];

const CK2_TARGETS: [u8; 19] = [
    0xa4,
    0xa3,
    0xa7,
    b'$',
    b'[',
    0x00,
    b'\\',
    b' ',
    b'\r',
    b'\n',
    b'"',
    b'{',
    b'}',
    b'@',
    b';',
    0x80,
    0x7e,
    0xbd,
    b'_',
];

/// Bytes the EU4 parsers treat as syntax
pub(crate) const EU4_ESCAPE_TARGETS: [bool; 256] = create_escape_target_table(&EU4_TARGETS);

/// Bytes the CK2 parsers treat as syntax
pub(crate) const CK2_ESCAPE_TARGETS: [bool; 256] = create_escape_target_table(&CK2_TARGETS);
