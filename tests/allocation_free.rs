// Integration tests: the cyclic entry points do not touch the heap once warmed up

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use krusty_otg::motion::{Calculator, InputParameter, Otg, OutputParameter, Synchronization, Trajectory};

thread_local! {
    static ALLOCATIONS: Cell<usize> = const { Cell::new(0) };
}

/// Counts allocations made by the current thread.
struct CountingAllocator;

unsafe impl GlobalAlloc for CountingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        unsafe { System.alloc(layout) }
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        unsafe { System.dealloc(ptr, layout) }
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let _ = ALLOCATIONS.try_with(|n| n.set(n.get() + 1));
        unsafe { System.realloc(ptr, layout, new_size) }
    }
}

#[global_allocator]
static GLOBAL: CountingAllocator = CountingAllocator;

fn allocations_during(f: impl FnOnce()) -> usize {
    let before = ALLOCATIONS.with(Cell::get);
    f();
    ALLOCATIONS.with(Cell::get) - before
}

fn input() -> InputParameter {
    let mut input = InputParameter::new(3);
    input.current_position = vec![0.0, -2.0, 0.0];
    input.target_position = vec![1.0, -3.0, 2.0];
    input.target_velocity = vec![0.0, 0.3, 0.0];
    input.max_velocity = vec![1.0; 3];
    input.max_acceleration = vec![1.0; 3];
    input.max_jerk = vec![1.0; 3];
    input
}

#[test]
fn calculator_reuses_its_buffers() {
    let mut calc = Calculator::new(3, 0.001);
    let mut trajectory = Trajectory::with_dofs(3);
    let mut replanned = Trajectory::with_dofs(3);
    let mut time_sync = input();
    let mut phase_sync = input();
    phase_sync.target_velocity = vec![0.0; 3];
    phase_sync.synchronization = Synchronization::Phase;

    calc.calculate_into(&time_sync, &mut trajectory).unwrap();
    calc.calculate_into(&phase_sync, &mut trajectory).unwrap();
    calc.continue_calculation_into(&time_sync, &trajectory, 1.0, &mut replanned).unwrap();

    time_sync.target_position[2] = 1.5;
    let n = allocations_during(|| calc.calculate_into(&time_sync, &mut trajectory).unwrap());
    assert_eq!(n, 0, "time synchronization");
    assert!((trajectory.state_at(2, trajectory.duration()).0 - 1.5).abs() < 1e-8);

    let n = allocations_during(|| calc.calculate_into(&phase_sync, &mut trajectory).unwrap());
    assert_eq!(n, 0, "phase synchronization");
    assert_eq!(trajectory.profiles()[0].t, trajectory.profiles()[2].t);

    let n = allocations_during(|| {
        let interrupted = calc.continue_calculation_into(&time_sync, &trajectory, 1.0, &mut replanned).unwrap();
        assert!(interrupted);
    });
    assert_eq!(n, 0, "continued calculation");
}

#[test]
fn online_cycles_do_not_allocate() {
    let mut otg = Otg::new(3, 0.001);
    let mut input = input();
    let mut output = OutputParameter::new(3);
    // Warm up with one interruption so every code path has run once
    for cycle in 0..20 {
        if cycle == 10 {
            input.target_position[1] = -2.5;
        }
        otg.update(&input, &mut output).unwrap();
        output.pass_to_input(&mut input);
    }

    let n = allocations_during(|| {
        for cycle in 0..2000 {
            if cycle == 500 {
                input.target_position[0] = -1.0;
            }
            otg.update(&input, &mut output).unwrap();
            output.pass_to_input(&mut input);
        }
    });
    assert_eq!(n, 0);
    let end = output.trajectory.state_at(0, output.trajectory.duration()).0;
    assert!((end + 1.0).abs() < 1e-8, "{end}");
}
