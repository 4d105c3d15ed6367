use haunted_house::timer::Timer;
use instant::{Duration, Instant};

#[test]
fn elapsed_accumulates_frame_deltas() {
    let start = Instant::now();
    let mut timer = Timer::starting_at(start);
    assert_eq!(timer.elapsed(), Duration::ZERO);

    assert_eq!(timer.update_at(start + Duration::from_millis(16)), Duration::from_millis(16));
    assert_eq!(timer.delta(), Duration::from_millis(16));

    assert_eq!(timer.update_at(start + Duration::from_millis(50)), Duration::from_millis(50));
    assert_eq!(timer.delta(), Duration::from_millis(34));
}

#[test]
fn time_never_runs_backwards() {
    let start = Instant::now();
    let mut timer = Timer::starting_at(start);
    timer.update_at(start + Duration::from_millis(40));

    let elapsed = timer.update_at(start + Duration::from_millis(10));
    assert_eq!(elapsed, Duration::from_millis(40));
    assert_eq!(timer.delta(), Duration::ZERO);

    // the late frame is measured from the latest instant seen
    timer.update_at(start + Duration::from_millis(60));
    assert_eq!(timer.elapsed(), Duration::from_millis(60));
    assert_eq!(timer.delta(), Duration::from_millis(20));
}

#[test]
fn repeated_instant_adds_nothing() {
    let start = Instant::now();
    let mut timer = Timer::starting_at(start);
    let now = start + Duration::from_millis(5);
    timer.update_at(now);
    timer.update_at(now);
    assert_eq!(timer.elapsed(), Duration::from_millis(5));
    assert_eq!(timer.delta(), Duration::ZERO);
}

#[test]
fn live_timer_is_monotonic() {
    let mut timer = Timer::new();
    let mut last = Duration::ZERO;
    for _ in 0..100 {
        let elapsed = timer.update();
        assert!(elapsed >= last);
        last = elapsed;
    }
}
