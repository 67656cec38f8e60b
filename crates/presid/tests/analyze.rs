//! PSID workflow: init once, play a number of frames, report usage.

mod common;

use common::{SID_CODE, SID_INIT, SID_PLAY, psid};
use presid::report::{write_memory_listing, write_patch_listing};
use presid::usage::UsageHistogram;
use presid::{
    CellState, ExecConfig, ExecError, Region, SID_REGISTERS, STACK_PAGE_REGION, Session, SidFile,
    SynthConfig,
};

fn played(subtune: u8, frames: u32) -> Session {
    let sid = SidFile::parse(&psid(SID_CODE, 1)).unwrap();
    let mut session = Session::new(ExecConfig::default());
    session.load_sid(&sid);
    let init = session.call_init(subtune).unwrap();
    assert!(init.balanced);
    let play = session.play_frames(frames, &mut |_: u32| {}).unwrap();
    assert_eq!(play.frames, frames);
    assert_eq!(play.unbalanced_calls, 0);
    session
}

fn listing(session: &Session, mask: CellState) -> String {
    let mut out = Vec::new();
    write_memory_listing(session.space(), mask, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn test_init_and_play() {
    let session = played(2, 3);
    let space = session.space();

    assert_eq!(space.peek(0x1100), 2);
    assert_eq!(space.state(0x1100), CellState::WRITTEN);
    assert_eq!(space.peek(0x1101), 3);
    assert_eq!(space.state(0x1101), CellState::READ | CellState::WRITTEN);
    assert_eq!(space.access_count(0x1101), 6);
    let init_read = CellState::INITIALIZED | CellState::READ;
    assert!(space.state(SID_INIT).contains(init_read));

    assert!(space.is_used(SID_REGISTERS));
    assert!(!space.is_used(STACK_PAGE_REGION));
    assert!(!space.is_used(Region::new(0x2000, 0x2FFF)));
}

#[test]
fn test_written_listing() {
    let session = played(2, 3);
    assert_eq!(
        listing(&session, CellState::WRITTEN),
        "1100: 02 1 (written)\n1101: 03 6 (read/written)\nD418: 0F 3 (written)\n"
    );
}

#[test]
fn test_asm_listing() {
    let session = played(2, 3);
    let program = session.synthesize(CellState::WRITTEN, &SynthConfig::default());
    let mut out = Vec::new();
    write_patch_listing(&program, &mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "LDX #$02\nSTX $1100\nINX\nSTX $1101\nLDX #$0F\nSTX $D418\nRTS\n"
    );
}

#[test]
fn test_clear_tracking_drops_init_marks() {
    let sid = SidFile::parse(&psid(SID_CODE, 1)).unwrap();
    let mut session = Session::new(ExecConfig::default());
    session.load_sid(&sid);
    assert_eq!(
        session.count_matching(CellState::INITIALIZED),
        SID_CODE.len()
    );

    session.clear_tracking();
    assert_eq!(session.count_matching(CellState::ALL), 0);
    assert_eq!(session.space().peek(SID_PLAY), 0xEE);
}

#[test]
fn test_entry_points_required() {
    let mut session = Session::new(ExecConfig::default());
    assert_eq!(
        session.call_init(0).unwrap_err(),
        ExecError::MissingEntryPoint("init")
    );
}

#[test]
fn test_usage_map_over_runs() {
    let mut combined = listing(&played(0, 5), CellState::ALL);
    combined.push_str(&listing(&played(1, 5), CellState::ALL));

    let histogram = UsageHistogram::parse(combined.as_bytes()).unwrap();
    assert_eq!(histogram.skipped(), 0);
    assert_eq!(histogram.uses(0x1101), 2);
    assert_eq!(histogram.uses(0xD418), 2);
    assert_eq!(histogram.uses(0x3000), 0);

    let mut out = Vec::new();
    histogram.render(&mut out).unwrap();
    let map = String::from_utf8(out).unwrap();
    let row = map.lines().nth(0x11).unwrap();
    assert!(row.starts_with("1100: 22"));
}
