//! Error discipline: any terminal error disables the instance until reset;
//! suspensions never do.

use reflate::decompress::Decompressor;
use reflate::{Error, Reader, Status, Writer};

#[test]
fn error_disables_instance_until_reset() {
    let mut d = Decompressor::new();
    let mut out = [0u8; 64];

    // bfinal=1, btype=3: reserved block type.
    let mut src = Reader::new(&[0x07], true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(
        d.decompress(&mut dst, &mut src).unwrap_err(),
        Error::BadBlockType
    );

    // Even a perfectly valid stream is refused now.
    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap_err(), Error::Disabled);

    d.reset();
    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
}

#[test]
fn suspension_does_not_disable() {
    let mut d = Decompressor::new();
    let mut out = [0u8; 64];

    let mut src = Reader::new(&[], false);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::ShortRead);

    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
}

#[test]
fn finished_instance_keeps_reporting_finished() {
    let mut d = Decompressor::new();
    let mut out = [0u8; 64];

    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
    assert!(d.is_finished());

    let mut src = Reader::new(b"ignored", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap(), Status::Finished);
    assert_eq!(src.pos(), 0);
}

#[test]
fn undersized_workbuf_is_rejected() {
    let (min, max) = Decompressor::workbuf_len();
    assert!(min >= 1 && max >= min);

    let mut d = Decompressor::new();
    let mut out = [0u8; 64];
    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(
        d.decompress_with_workbuf(&mut dst, &mut src, &mut [])
            .unwrap_err(),
        Error::BadWorkbufLength
    );

    // A correctly sized scratch buffer works; the reject above must not
    // have disabled the instance.
    let mut workbuf = vec![0u8; min];
    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(
        d.decompress_with_workbuf(&mut dst, &mut src, &mut workbuf)
            .unwrap(),
        Status::Finished
    );
}

#[test]
fn oversubscribed_dynamic_header_is_terminal() {
    // HLIT=257, HDIST=1, HCLEN=4 with an over-subscribed code-length
    // alphabet: three symbols of length 1.
    let bytes = {
        // bits: 1 (final), 01 under LSB for btype=2, counts, then
        // precode lengths 1,1,0,1 for order 16,17,18,0.
        let mut v: u64 = 0;
        let mut n = 0;
        let push = |val: u64, bits: u32, v: &mut u64, n: &mut u32| {
            *v |= val << *n;
            *n += bits;
        };
        push(1, 1, &mut v, &mut n);
        push(2, 2, &mut v, &mut n);
        push(0, 5, &mut v, &mut n);
        push(0, 5, &mut v, &mut n);
        push(0, 4, &mut v, &mut n);
        push(1, 3, &mut v, &mut n);
        push(1, 3, &mut v, &mut n);
        push(0, 3, &mut v, &mut n);
        push(1, 3, &mut v, &mut n);
        let mut bytes = v.to_le_bytes().to_vec();
        bytes.truncate(((n + 7) / 8) as usize);
        bytes
    };

    let mut d = Decompressor::new();
    let mut out = [0u8; 64];
    let mut src = Reader::new(&bytes, true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(
        d.decompress(&mut dst, &mut src).unwrap_err(),
        Error::OverSubscribedCode
    );

    let mut src = Reader::new(b"\x03\x00", true);
    let mut dst = Writer::new(&mut out);
    assert_eq!(d.decompress(&mut dst, &mut src).unwrap_err(), Error::Disabled);
}
