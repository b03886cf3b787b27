#![no_main]

use arbitrary::Arbitrary;
use maplayers_core::{PointerInput, SortEvent, SortGesture, SortGestureConfig};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
enum Op {
    Down(i16),
    Move(i16),
    Up(i16),
    Cancel,
}

#[derive(Debug, Arbitrary)]
struct Input {
    row_height: u8,
    threshold: u8,
    lock: bool,
    items: u8,
    can_start: bool,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let items = usize::from(input.items % 32);
    let mut gesture = SortGesture::new(SortGestureConfig {
        row_height: u16::from(input.row_height),
        distance_threshold: u16::from(input.threshold),
        lock_to_container_edges: input.lock,
    });

    let mut started = false;
    for op in input.ops.iter().take(256) {
        let pointer = match *op {
            Op::Down(y) => PointerInput::Down { y: i32::from(y) },
            Op::Move(y) => PointerInput::Move { y: i32::from(y) },
            Op::Up(y) => PointerInput::Up { y: i32::from(y) },
            Op::Cancel => PointerInput::Cancel,
        };
        for event in gesture.process(pointer, items, input.can_start) {
            match event {
                SortEvent::SortStart { index } => {
                    assert!(!started, "nested sort start");
                    assert!(index < items, "start index out of range");
                    started = true;
                }
                SortEvent::SortOver { index, over } => {
                    assert!(started, "over before start");
                    assert!(index < items && over < items, "over index out of range");
                }
                SortEvent::SortEnd {
                    old_index,
                    new_index,
                } => {
                    assert!(started, "end before start");
                    assert!(old_index < items && new_index < items, "end index out of range");
                    started = false;
                }
                SortEvent::SortCancel => {
                    assert!(started, "cancel before start");
                    started = false;
                }
            }
        }
        assert_eq!(gesture.is_sorting(), started, "sorting flag diverged");
        if !input.can_start {
            assert!(!started, "read-only list started sorting");
        }
    }
});
