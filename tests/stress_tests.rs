//! Stress tests for concurrent emission
//!
//! These tests verify:
//! - Messages from concurrent threads never interleave
//! - Domain creation and configuration are safe while other threads log
//! - Multi-line padding state does not leak between messages

use rust_domain_logger::core::LogValue;
use rust_domain_logger::prelude::*;
use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;
const MESSAGES_PER_THREAD: usize = 500;

fn memory_registry() -> (Arc<DomainRegistry>, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let registry = DomainRegistry::builder().root_sink(sink.clone()).build();
    (Arc::new(registry), sink)
}

/// Test that two threads writing to one domain produce contiguous messages
#[test]
fn test_concurrent_messages_do_not_interleave() {
    let (registry, sink) = memory_registry();
    registry.domain(".shared").unwrap().set_prints_name(true);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_id| {
            let registry = Arc::clone(&registry);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let domain = registry.domain(".shared").unwrap();
                let site = CallSite::new("stress", "worker", "s.rs", 1);
                barrier.wait();
                for i in 0..MESSAGES_PER_THREAD {
                    emit(
                        domain,
                        &site,
                        LogLevel::Debug,
                        &[
                            LogValue::Text("thread=".into()),
                            LogValue::Unsigned(thread_id as u64),
                            LogValue::Text(" seq=".into()),
                            LogValue::Unsigned(i as u64),
                            LogValue::Text(" end".into()),
                        ],
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let out = sink.contents();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), THREADS * MESSAGES_PER_THREAD);

    let mut seen = HashSet::new();
    for line in lines {
        let payload = line
            .split(">> ")
            .nth(1)
            .unwrap_or_else(|| panic!("Malformed line: {:?}", line));
        assert!(payload.starts_with("thread=") && payload.ends_with(" end"), "Interleaved: {:?}", line);
        assert!(seen.insert(payload.to_string()), "Duplicate: {:?}", line);
    }
}

/// Test that multi-line messages keep their continuation lines together
#[test]
fn test_concurrent_multi_line_messages() {
    let (registry, sink) = memory_registry();

    let handles: Vec<_> = (0..4)
        .map(|thread_id| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                let site = CallSite::new("stress", "block", "s.rs", 2);
                for _ in 0..100 {
                    let block = format!("head {}\nbody {}", thread_id, thread_id);
                    emit(
                        registry.root(),
                        &site,
                        LogLevel::Debug,
                        &[LogValue::Text(block.as_str().into())],
                    );
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let out = sink.contents();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4 * 100 * 2);
    let indent = " ".repeat("stress::block >> ".len());
    for pair in lines.chunks(2) {
        let thread_id = pair[0]
            .strip_prefix("stress::block >> head ")
            .unwrap_or_else(|| panic!("Unexpected first line: {:?}", pair[0]));
        assert_eq!(pair[1], format!("{}body {}", indent, thread_id));
    }
}

/// Test that creating and configuring domains while logging is safe
#[test]
fn test_configuration_while_logging() {
    let (registry, sink) = memory_registry();
    let barrier = Arc::new(Barrier::new(2));

    let writer = {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            let site = CallSite::new("stress", "writer", "s.rs", 3);
            barrier.wait();
            for i in 0..1000 {
                let domain = registry.domain(&format!(".dyn.d{}", i % 50)).unwrap();
                emit(domain, &site, LogLevel::Error, &[LogValue::Integer(i)]);
            }
        })
    };

    let configurer = {
        let registry = Arc::clone(&registry);
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 0..200 {
                let domain = registry.domain(".dyn").unwrap();
                domain.set_prints_name(i % 2 == 0);
                domain.set_max_level(if i % 3 == 0 { LogLevel::Debug } else { LogLevel::Warning });
                registry.domain(&format!(".dyn.extra{}", i)).unwrap();
            }
        })
    };

    writer.join().expect("Writer panicked");
    configurer.join().expect("Configurer panicked");

    // errors pass every level setting used above
    assert_eq!(sink.contents().lines().count(), 1000);
    assert_eq!(registry.domain_count(), 1 + 1 + 50 + 200);
}
