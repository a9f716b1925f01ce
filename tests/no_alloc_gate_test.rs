use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use stackfall::core::{can_place, ghost_y, try_rotate, Board, GameConfig, GameState, RotationDirection, Tetromino};
use stackfall::types::{GameIntent, PieceKind};

struct CountingAlloc;

static COUNT_ENABLED: AtomicBool = AtomicBool::new(false);
static ALLOC_COUNT: AtomicUsize = AtomicUsize::new(0);

#[global_allocator]
static GLOBAL: CountingAlloc = CountingAlloc;

unsafe impl GlobalAlloc for CountingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        if COUNT_ENABLED.load(Ordering::Relaxed) {
            ALLOC_COUNT.fetch_add(1, Ordering::Relaxed);
        }
        System.realloc(ptr, layout, new_size)
    }
}

fn with_alloc_counting<F: FnOnce()>(f: F) -> usize {
    ALLOC_COUNT.store(0, Ordering::Relaxed);
    COUNT_ENABLED.store(true, Ordering::Relaxed);
    f();
    COUNT_ENABLED.store(false, Ordering::Relaxed);
    ALLOC_COUNT.load(Ordering::Relaxed)
}

#[test]
fn movement_and_gravity_do_not_allocate() {
    // Setup (outside counting) so one-time allocations don't trip the gate.
    let mut gs = GameState::new(GameConfig::default(), 1).unwrap();
    let _ = gs.apply(GameIntent::MoveLeft);

    let allocs = with_alloc_counting(|| {
        for _ in 0..50 {
            let _ = gs.apply(GameIntent::MoveLeft);
            let _ = gs.apply(GameIntent::MoveRight);
            let _ = gs.apply(GameIntent::RotateCw);
            let _ = gs.apply(GameIntent::RotateCcw);
        }
        // Ticks until just above the floor; locking allocates the cleared-row list.
        for _ in 0..10 {
            let _ = gs.apply(GameIntent::TickElapsed);
        }
        let _ = gs.apply(GameIntent::Pause);
        let _ = gs.apply(GameIntent::TickElapsed);
        let _ = gs.apply(GameIntent::Resume);
    });

    assert_eq!(allocs, 0);
}

#[test]
fn collision_queries_do_not_allocate() {
    let board = Board::standard();
    let piece = Tetromino::spawn(PieceKind::T, board.width());

    let allocs = with_alloc_counting(|| {
        for _ in 0..100 {
            assert!(can_place(&board, &piece));
            assert_eq!(ghost_y(&board, &piece), 18);
            assert!(try_rotate(&board, &piece, RotationDirection::Clockwise).is_some());
        }
    });

    assert_eq!(allocs, 0);
}
