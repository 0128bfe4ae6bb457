use std::{
    fs,
    io::{self, Write},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    thread,
};

use chrono::{DateTime, FixedOffset, TimeZone};
use ezlogger::{
    args, Builder, Clock, FixedClock, FormatError, Level, LogError, Logger, SharedBuffer, SinkKind,
    LINE_SEPARATOR,
};

fn instant() -> DateTime<FixedOffset> {
    FixedOffset::east_opt(0)
        .unwrap()
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .unwrap()
}

struct Console {
    out: SharedBuffer,
    err: SharedBuffer,
}

fn builder_in(dir: &Path) -> (Builder, Console) {
    let console = Console {
        out: SharedBuffer::new(),
        err: SharedBuffer::new(),
    };
    let template = dir.join("${name}_${datefmt(yyyyMMdd-HHmmss)}.log");
    let builder = Logger::builder()
        .with_name("svc")
        .with_file_name_template(template.to_string_lossy())
        .with_clock(FixedClock(instant()))
        .with_console_writers(console.out.clone(), console.err.clone());
    (builder, console)
}

fn file_lines(logger: &Logger) -> Vec<String> {
    let path = logger.file_path().expect("file sink enabled");
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
struct CountingClock {
    calls: Arc<AtomicUsize>,
}

impl Clock for CountingClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        instant()
    }
}

#[derive(Clone)]
struct BrokenWriter;

impl Write for BrokenWriter {
    fn write(&mut self, _data: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::Other, "stream closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_round_trip_to_file_and_console() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_header("svc v1.0").build().unwrap();

    logger.info_with("count=%d", &args![3]).unwrap();
    logger.close().unwrap();

    let lines = file_lines(&logger);
    assert_eq!(lines, vec!["svc v1.0", "[svc] - 03:04:05 : : count=3"]);
    assert_eq!(
        console.out.contents(),
        format!("svc v1.0{LINE_SEPARATOR}[svc] - 03:04:05 : : count=3{LINE_SEPARATOR}")
    );
    assert_eq!(console.err.contents(), "");
}

#[test]
fn test_file_name_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, _console) = builder_in(dir.path());
    let logger = builder.build().unwrap();

    let path = logger.file_path().unwrap();
    assert_eq!(path.file_name().unwrap(), "svc_20240102-030405.log");
    assert_eq!(path.parent().unwrap(), dir.path());
    assert!(path.is_file());
}

#[test]
fn test_disabled_levels_do_nothing() {
    for level in Level::ALL {
        let dir = tempfile::tempdir().unwrap();
        let (builder, console) = builder_in(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let logger = builder
            .with_info(level != Level::Info)
            .with_debug(level != Level::Debug)
            .with_err(level != Level::Err)
            .with_clock(CountingClock {
                calls: calls.clone(),
            })
            .build()
            .unwrap();
        let calls_after_open = calls.load(Ordering::SeqCst);

        logger.log("dropped %s", level, &args!["x"]).unwrap();
        match level {
            Level::Info => logger.info("dropped").unwrap(),
            Level::Debug => logger.debug("dropped").unwrap(),
            Level::Err => logger.err_value(&"dropped").unwrap(),
        }

        assert_eq!(calls.load(Ordering::SeqCst), calls_after_open, "{level}");
        assert_eq!(console.out.contents(), "", "{level}");
        assert_eq!(console.err.contents(), "", "{level}");
        assert!(file_lines(&logger).is_empty(), "{level}");
    }
}

#[test]
fn test_only_enabled_sinks_receive_output() {
    for (to_console, to_file) in [(false, false), (false, true), (true, false), (true, true)] {
        let dir = tempfile::tempdir().unwrap();
        let (builder, console) = builder_in(dir.path());
        let logger = builder
            .with_console(to_console)
            .with_file(to_file)
            .build()
            .unwrap();

        logger.info("hello").unwrap();
        logger.close().unwrap();

        let expected = format!("[svc] - 03:04:05 : : hello{LINE_SEPARATOR}");
        if to_console {
            assert_eq!(console.out.contents(), expected);
        } else {
            assert_eq!(console.out.contents(), "");
        }

        let files = fs::read_dir(dir.path()).unwrap().count();
        if to_file {
            assert_eq!(files, 1);
            assert_eq!(file_lines(&logger), vec![expected.trim_end().to_string()]);
        } else {
            assert_eq!(files, 0);
            assert!(logger.file_path().is_none());
        }
    }
}

#[test]
fn test_header_written_once_before_lines() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder
        .with_header("== ${name} started ${datefmt(yyyy-MM-dd)} ==")
        .build()
        .unwrap();

    for i in 0..5 {
        logger.info_with("line %d", &args![i]).unwrap();
    }
    logger.err("boom").unwrap();

    let header = "== svc started 2024-01-02 ==";
    let lines = file_lines(&logger);
    assert_eq!(lines.len(), 7);
    assert_eq!(lines[0], header);
    assert_eq!(lines.iter().filter(|l| l.as_str() == header).count(), 1);

    let out = console.out.contents();
    assert!(out.starts_with(header));
    assert_eq!(out.matches(header).count(), 1);
    assert!(!console.err.contents().contains(header));
}

#[test]
fn test_empty_header_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.build().unwrap();

    assert!(file_lines(&logger).is_empty());
    assert_eq!(console.out.contents(), "");
}

#[test]
fn test_errors_go_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.build().unwrap();

    logger.err_with("failed after %d tries", &args![3]).unwrap();
    logger.debug("detail").unwrap();

    assert_eq!(
        console.err.contents(),
        format!("[svc] - 03:04:05 [Error]: : failed after 3 tries{LINE_SEPARATOR}")
    );
    assert_eq!(
        console.out.contents(),
        format!("[svc] - 03:04:05 [Debug]: : detail{LINE_SEPARATOR}")
    );
    assert_eq!(file_lines(&logger).len(), 2);
}

#[test]
fn test_line_fmt_off_uses_bare_separator() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_line_fmt(false).with_file(false).build().unwrap();

    logger.err("boom").unwrap();
    logger.info("ok").unwrap();

    assert_eq!(console.err.contents(), format!(": boom{LINE_SEPARATOR}"));
    assert_eq!(console.out.contents(), format!(": ok{LINE_SEPARATOR}"));
}

#[test]
fn test_custom_line_template() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder
        .with_line_template("${datefmt(HH:mm)} ${loglevel}")
        .with_file(false)
        .build()
        .unwrap();

    logger.err_with("%s", &args!["x"]).unwrap();

    assert_eq!(console.err.contents(), format!("03:04 [Error]: x{LINE_SEPARATOR}"));
}

#[test]
fn test_value_form_keeps_percent_literal() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_line_template("").with_file(false).build().unwrap();

    logger.info_value(&"100%d done").unwrap();
    logger.debug_value(&42).unwrap();

    assert_eq!(
        console.out.contents(),
        format!("100%d done{LINE_SEPARATOR}42{LINE_SEPARATOR}")
    );
}

#[test]
fn test_no_args_form_matches_empty_args() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_line_template("").with_file(false).build().unwrap();

    logger.log("50% off", Level::Info, &[]).unwrap();
    logger.info("50% off").unwrap();

    assert_eq!(
        console.out.contents(),
        format!("50% off{LINE_SEPARATOR}50% off{LINE_SEPARATOR}")
    );

    let err = logger.info("5%d").unwrap_err();
    assert!(matches!(
        err,
        LogError::Format(FormatError::MissingArgument { .. })
    ));
}

#[test]
fn test_percent_in_name_consumes_argument() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_name("load%d").with_file(false).build().unwrap();

    let err = logger.info("up").unwrap_err();
    assert!(matches!(
        err,
        LogError::Format(FormatError::MissingArgument { .. })
    ));
    assert_eq!(console.out.contents(), "");

    logger.info_with("%s", &args![90, "up"]).unwrap();
    assert_eq!(
        console.out.contents(),
        format!("[load90] - 03:04:05 : : up{LINE_SEPARATOR}")
    );
}

#[test]
fn test_close_is_terminal() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder.with_header("head").build().unwrap();
    logger.info("before").unwrap();

    assert!(logger.is_open());
    logger.close().unwrap();
    assert!(!logger.is_open());

    let out_before = console.out.contents();
    let file_before = file_lines(&logger);

    assert!(matches!(logger.close(), Err(LogError::Closed)));
    assert!(matches!(logger.info("after"), Err(LogError::Closed)));
    assert!(matches!(logger.debug_with("%d", &args![1]), Err(LogError::Closed)));
    assert!(matches!(logger.err_value(&"after"), Err(LogError::Closed)));
    assert!(matches!(
        logger.log("after", Level::Err, &[]),
        Err(LogError::Closed)
    ));

    assert_eq!(console.out.contents(), out_before);
    assert_eq!(console.err.contents(), "");
    assert_eq!(file_lines(&logger), file_before);
}

#[test]
fn test_closed_check_precedes_level_gate() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, _console) = builder_in(dir.path());
    let logger = builder.with_debug(false).build().unwrap();
    logger.close().unwrap();

    assert!(matches!(logger.debug("x"), Err(LogError::Closed)));
}

#[test]
fn test_build_fails_when_directory_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("blocker");
    fs::write(&blocker, "").unwrap();

    let (builder, console) = builder_in(dir.path());
    let result = builder
        .with_header("head")
        .with_file_name_template(blocker.join("svc.log").to_string_lossy())
        .build();

    assert!(matches!(result, Err(LogError::DirectoryCreation { .. })));
    assert_eq!(console.out.contents(), "");
}

#[test]
fn test_build_fails_when_file_cannot_be_created() {
    let dir = tempfile::tempdir().unwrap();
    let taken = dir.path().join("taken");
    fs::create_dir(&taken).unwrap();

    let (builder, _console) = builder_in(dir.path());
    let result = builder
        .with_file_name_template(taken.to_string_lossy())
        .build();

    match result {
        Err(LogError::FileCreation { path, .. }) => assert_eq!(path, taken),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("build should fail"),
    }
}

#[test]
fn test_existing_file_is_replaced_on_build() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, _console) = builder_in(dir.path());

    let first = builder.build().unwrap();
    first.info("first").unwrap();
    first.close().unwrap();

    let second = builder.build().unwrap();
    second.info("second").unwrap();
    second.close().unwrap();

    assert_eq!(first.file_path(), second.file_path());
    assert_eq!(file_lines(&second), vec!["[svc] - 03:04:05 : : second"]);
}

#[test]
fn test_write_failure_is_reported_and_file_still_written() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, _console) = builder_in(dir.path());
    let logger = builder
        .with_console_writers(SharedBuffer::new(), BrokenWriter)
        .build()
        .unwrap();

    let err = logger.err("boom").unwrap_err();

    assert!(matches!(
        err,
        LogError::Write {
            sink: SinkKind::Console,
            ..
        }
    ));
    assert_eq!(file_lines(&logger), vec!["[svc] - 03:04:05 [Error]: : boom"]);
}

#[test]
fn test_console_header_failure_leaves_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, _console) = builder_in(dir.path());
    let result = builder
        .with_header("head")
        .with_console_writers(BrokenWriter, SharedBuffer::new())
        .build();

    assert!(matches!(
        result,
        Err(LogError::Write {
            sink: SinkKind::Console,
            ..
        })
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_header_with_bad_date_pattern_fails_build() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let result = builder.with_header("started ${datefmt(qq)}").build();

    assert!(matches!(
        result,
        Err(LogError::Format(FormatError::InvalidDatePattern { letter: 'q', .. }))
    ));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(console.out.contents(), "");
}

#[test]
fn test_line_template_with_zone_and_week_letters() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = builder
        .with_line_template("${datefmt(YYYY-'W'ww HH:mm z)} ")
        .build()
        .unwrap();

    logger.info("hello").unwrap();

    assert_eq!(file_lines(&logger), vec!["2024-W01 03:04 UTC hello"]);
    assert_eq!(console.out.contents(), format!("2024-W01 03:04 UTC hello{LINE_SEPARATOR}"));
}

#[test]
fn test_concurrent_lines_do_not_interleave() {
    let dir = tempfile::tempdir().unwrap();
    let (builder, console) = builder_in(dir.path());
    let logger = Arc::new(builder.with_line_template("${name}|").build().unwrap());

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let logger = logger.clone();
            thread::spawn(move || {
                for i in 0..100 {
                    logger
                        .info_with("thread %d line %03d", &args![t, i])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    logger.close().unwrap();

    let out = console.out.contents();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 800);
    for line in &lines {
        let rest = line.strip_prefix("svc|thread ").unwrap();
        let (thread, index) = rest.split_once(" line ").unwrap();
        assert!(thread.parse::<u32>().unwrap() < 8);
        assert_eq!(index.len(), 3);
    }

    assert_eq!(file_lines(&logger).len(), 800);
}
