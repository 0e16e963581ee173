/*!

A reversible escape encoding that smuggles non-Latin text through the
localisation files of [EU4](https://en.wikipedia.org/wiki/Europa_Universalis_IV)
and [CK2](https://en.wikipedia.org/wiki/Crusader_Kings_II).

The games read `.txt` and `.csv` files as windows-1252 byte streams and
convert `.yml` files into windows-1252 after reading them, so a codepoint
that needs two bytes can't be written as is. Instead it is written as three
units: an escape marker, its low byte, and its high byte. Bytes that the
game's parser treats as syntax (quotes, braces, `$`, `\`, whitespace, ...)
are shifted out of the way and the marker records which halves were
shifted. A patched game font renders the sequence as the original
character.

## Quick Start

```rust
use pdx_escape::{Format, Variant};

let format = Format::new(Variant::Eu4, "txt").unwrap();
let data = format.to_vec("日本").unwrap();
assert_eq!(data, vec![0x10, 0xe5, 0x65, 0x10, 0x2c, 0x67]);
assert_eq!(format.from_slice(&data).unwrap(), "日本");
```

## One Level Lower

The escape step works on codepoints and is independent of any file format.

```rust
use pdx_escape::{decode, encode, EscapeConfig};

let out = encode([0x41, 0x0, 0x3042], &EscapeConfig::CK2);
assert_eq!(out.units, vec![0x41, 0x10, 0x42, 0x30]);

// the null character was dropped
assert_eq!(out.diagnostics.len(), 1);

assert_eq!(decode(&out.units, &EscapeConfig::CK2).unwrap(), vec![0x41, 0x3042]);
```

## Caveats

- Codepoints above the basic multilingual plane and null characters are
  dropped and reported as diagnostics.
- Raw 0x10 - 0x13 control characters are indistinguishable from escape
  markers and can't be decoded.

*/

mod codepage;
mod data;
mod errors;
mod escape;
mod format;
mod serializer;
mod transcode;

pub use self::codepage::{from_codepage, to_codepage};
pub use self::errors::*;
pub use self::escape::{
    decode, encode, Diagnostic, DiagnosticKind, Encoded, EscapeConfig, EscapeMarker, Variant,
};
pub use self::format::{CodepageMode, Format};
pub use self::serializer::Serializer;
pub use self::transcode::{Direction, FileReport, Transcoder, DEFAULT_SUFFIX};
