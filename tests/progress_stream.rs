use std::io::{self, Read};

use ffgraph::{Progress, ProgressParser, progress};

/// Hands out the wrapped bytes a few at a time, like a slow pipe.
struct Trickle<'a> {
    data: &'a [u8],
    step: usize,
}

impl Read for Trickle<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.step.min(buf.len()).min(self.data.len());
        buf[..n].copy_from_slice(&self.data[..n]);
        self.data = &self.data[n..];
        Ok(n)
    }
}

/// Returns one chunk, then fails.
struct Broken {
    sent: bool,
}

impl Read for Broken {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.sent {
            return Err(io::Error::other("pipe closed"));
        }
        self.sent = true;
        let data = b"frame=7\nprogress=continue\n";
        buf[..data.len()].copy_from_slice(data);
        Ok(data.len())
    }
}

const BLOCK: &[u8] = b"frame=120\nfps=29.97\nbitrate=1534.2kbits/s\ntotal_size=1048576\n\
out_time=00:00:04.004000\nout_time_ms=4004000\nspeed=1.02x\nprogress=continue\n";

#[test]
fn whole_block_in_one_read() {
    let mut seen = Vec::new();
    let n = progress::feed(BLOCK, |p| seen.push(p));
    assert_eq!(n, 1);

    let p = &seen[0];
    assert_eq!(p.frame, Some(120));
    assert_eq!(p.fps, Some(29.97));
    assert_eq!(p.bitrate.as_deref(), Some("1534.2kbits/s"));
    assert_eq!(p.total_size, Some(1_048_576));
    assert_eq!(p.out_time.as_deref(), Some("00:00:04.004000"));
    assert_eq!(p.out_time_ms, Some(4_004_000));
    assert_eq!(p.speed.as_deref(), Some("1.02x"));
    assert_eq!(p.progress.as_deref(), Some("continue"));
    assert!(!p.is_end());
}

#[test]
fn no_field_is_lost_at_any_chunk_boundary() {
    for step in 1..BLOCK.len() {
        let mut merged = Progress::default();
        progress::feed(Trickle { data: BLOCK, step }, |p| {
            // Fold every snapshot; a split pair would leave a field missing.
            if p.frame.is_some() {
                merged.frame = p.frame;
            }
            if p.progress.is_some() {
                merged.progress = p.progress;
            }
        });
        assert_eq!(merged.frame, Some(120), "step {step}");
        assert_eq!(merged.progress.as_deref(), Some("continue"), "step {step}");
    }
}

#[test]
fn speed_only_stream_emits_nothing() {
    let n = progress::feed(&b"speed=1.02x\n"[..], |_| panic!("unexpected emission"));
    assert_eq!(n, 0);
}

#[test]
fn several_blocks_and_noise() {
    let stream = b"ffmpeg version 7.0 Copyright (c) 2000-2024\n\
Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'in.mp4':\n\
frame=10\nprogress=continue\n";
    let mut parser = ProgressParser::new();
    let p = parser.push(stream).unwrap();
    assert_eq!(p.frame, Some(10));

    assert_eq!(parser.push(b"frame=0\nprogress=end\n").map(|p| p.is_end()), Some(true));
}

#[test]
fn read_error_ends_the_stream() {
    let mut seen = Vec::new();
    let n = progress::feed(Broken { sent: false }, |p| seen.push(p));
    assert_eq!(n, 1);
    assert_eq!(seen[0].frame, Some(7));
}

#[test]
fn crlf_lines_are_accepted() {
    let mut parser = ProgressParser::new();
    let p = parser.push(b"frame=5\r\nprogress=continue\r\n").unwrap();
    assert_eq!(p.frame, Some(5));
    assert_eq!(p.progress.as_deref(), Some("continue"));
}
