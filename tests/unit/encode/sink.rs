use super::*;

#[test]
fn in_memory_sink_records_frames_in_order() {
    let mut sink = InMemorySink::new();
    let cfg = SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::new(24, 1).unwrap(),
    };
    sink.begin(cfg).unwrap();
    for i in 0..3 {
        sink.push_frame(FrameIndex(i), &FrameRGBA::transparent(1, 1))
            .unwrap();
    }
    assert!(!sink.is_finished());
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config(), Some(cfg));
    assert_eq!(
        sink.frames().iter().map(|(i, _)| i.0).collect::<Vec<_>>(),
        vec![0, 1, 2]
    );
}

#[test]
fn begin_resets_previous_run() {
    let mut sink = InMemorySink::new();
    let cfg = SinkConfig {
        width: 1,
        height: 1,
        fps: Fps::new(30, 1).unwrap(),
    };
    sink.begin(cfg).unwrap();
    sink.push_frame(FrameIndex(0), &FrameRGBA::transparent(1, 1))
        .unwrap();
    sink.end().unwrap();

    sink.begin(cfg).unwrap();
    assert!(sink.frames().is_empty());
    assert!(!sink.is_finished());
}
