//! Default key bindings for speechpad

use std::collections::HashMap;

/// Key sequence type
pub type KeySequence = Vec<u8>;

/// Action identifier for key bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    // Convert button: speak, pause, resume
    Convert,

    // Save button
    Save,

    // Voice selector
    NextVoice,
    PrevVoice,
    DefaultVoice,
    ReloadVoices,

    // Speed control
    SpeedUp,
    SpeedDown,
    EnterSpeed,

    // Text field
    Paste,
    ClearText,
    Backspace,

    Quit,
}

/// Create the default keymap
pub fn create_default_keymap() -> HashMap<KeySequence, KeyAction> {
    let mut map = HashMap::new();

    // Enter (raw mode delivers CR; LF for piped or odd terminals)
    map.insert(b"\r".to_vec(), KeyAction::Convert);
    map.insert(b"\n".to_vec(), KeyAction::Convert);

    // ctrl+s
    map.insert(b"\x13".to_vec(), KeyAction::Save);

    // Voice selection (alt+v / alt+V, alt+d default, alt+r reload)
    map.insert(b"\x1bv".to_vec(), KeyAction::NextVoice);
    map.insert(b"\x1bV".to_vec(), KeyAction::PrevVoice);
    map.insert(b"\x1bd".to_vec(), KeyAction::DefaultVoice);
    map.insert(b"\x1br".to_vec(), KeyAction::ReloadVoices);

    // Speed (alt+= and alt++ up, alt+- down, alt+s type a value)
    map.insert(b"\x1b=".to_vec(), KeyAction::SpeedUp);
    map.insert(b"\x1b+".to_vec(), KeyAction::SpeedUp);
    map.insert(b"\x1b-".to_vec(), KeyAction::SpeedDown);
    map.insert(b"\x1bs".to_vec(), KeyAction::EnterSpeed);

    // Text editing
    map.insert(b"\x1bp".to_vec(), KeyAction::Paste);
    map.insert(b"\x15".to_vec(), KeyAction::ClearText); // ctrl+u
    map.insert(b"\x08".to_vec(), KeyAction::Backspace);
    map.insert(b"\x7f".to_vec(), KeyAction::Backspace);

    // ctrl+c / ctrl+d
    map.insert(b"\x03".to_vec(), KeyAction::Quit);
    map.insert(b"\x04".to_vec(), KeyAction::Quit);

    map
}

/// Split raw terminal input into key sequences
///
/// One read can hold several keys (type-ahead, pasted text). Bound
/// sequences are matched longest first. Unbound CSI/SS3 sequences such as
/// arrow keys stay whole, as do `ESC x` pairs; anything else is taken one
/// UTF-8 character at a time.
pub fn split_keys<'a>(input: &'a [u8], keymap: &HashMap<KeySequence, KeyAction>) -> Vec<&'a [u8]> {
    let longest = keymap.keys().map(Vec::len).max().unwrap_or(1);
    let mut keys = Vec::new();
    let mut rest = input;

    while !rest.is_empty() {
        let len = (1..=longest.min(rest.len()))
            .rev()
            .find(|&len| keymap.contains_key(&rest[..len]))
            .unwrap_or_else(|| unbound_key_len(rest));
        let (key, tail) = rest.split_at(len);
        keys.push(key);
        rest = tail;
    }

    keys
}

/// Length of the unbound key at the start of `input`
fn unbound_key_len(input: &[u8]) -> usize {
    match input {
        // CSI / SS3: parameters, then one final byte in 0x40..=0x7e
        [0x1b, b'[' | b'O', rest @ ..] => rest
            .iter()
            .position(|b| (0x40..=0x7e).contains(b))
            .map_or(input.len(), |i| i + 3),
        [0x1b, next, ..] if next.is_ascii_graphic() => 2,
        [first, ..] => {
            let len = match first {
                0xc0..=0xdf => 2,
                0xe0..=0xef => 3,
                0xf0..=0xf7 => 4,
                _ => 1,
            };
            len.min(input.len())
        }
        [] => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_text_and_enter() {
        let keymap = create_default_keymap();
        let keys = split_keys(b"Hi\r", &keymap);
        assert_eq!(keys, vec![&b"H"[..], &b"i"[..], &b"\r"[..]]);
    }

    #[test]
    fn test_split_escape_sequences() {
        let keymap = create_default_keymap();
        let keys = split_keys(b"a\x1b[1;5Ab\x1bv\x1bOA\x1bx", &keymap);
        assert_eq!(
            keys,
            vec![
                &b"a"[..],
                &b"\x1b[1;5A"[..],
                &b"b"[..],
                &b"\x1bv"[..],
                &b"\x1bOA"[..],
                &b"\x1bx"[..],
            ]
        );

        // A lone escape is a key of its own
        assert_eq!(split_keys(b"\x1b", &keymap), vec![&b"\x1b"[..]]);
    }

    #[test]
    fn test_split_multibyte_chars() {
        let keymap = create_default_keymap();
        let input = "é世".as_bytes();
        let keys = split_keys(input, &keymap);
        assert_eq!(keys, vec!["é".as_bytes(), "世".as_bytes()]);
    }
}
