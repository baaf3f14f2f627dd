//! Test fixture generators
//!
//! This module provides canonical driver shapes the analysis is expected
//! to handle, plus a serialized `.rir` unit for ingestion tests.

use super::builders::{call, load, lock, store, unlock, ProcedureBuilder, ProgramBuilder};
use raceguard_ir::shared::Program;

/// Two entry points hitting one counter with no locking at all.
/// Expected: one violated read/write pair on `counter`.
pub fn fixture_unguarded_counter() -> Program {
    ProgramBuilder::new("drivers/char/fake.c")
        .with_global("counter")
        .with_entry_point("ioctl", vec![store("counter")])
        .with_entry_point("irq_handler", vec![load("counter")])
        .build()
}

/// Two entry points guarding the same counter with the same mutex.
/// Expected: `counter` never becomes a candidate, nothing is reported.
pub fn fixture_guarded_counter() -> Program {
    let guarded = || vec![lock("dev_mutex"), store("counter"), unlock("dev_mutex")];
    ProgramBuilder::new("drivers/char/fake.c")
        .with_lock("dev_mutex")
        .with_entry_point("ioctl", guarded())
        .with_entry_point("write", guarded())
        .build()
}

/// Three entry points where every pair shares a lock but no lock covers
/// all three: `a` holds {lock_a}, `b` holds {lock_a, lock_b}, `c` holds
/// {lock_b}. Expected: (a, b) and (b, c) verify, (a, c) violates.
pub fn fixture_pairwise_guards() -> Program {
    ProgramBuilder::new("drivers/net/fake.c")
        .with_lock("lock_a")
        .with_lock("lock_b")
        .with_entry_point("a", vec![lock("lock_a"), store("state"), unlock("lock_a")])
        .with_entry_point(
            "b",
            vec![
                lock("lock_a"),
                lock("lock_b"),
                store("state"),
                unlock("lock_b"),
                unlock("lock_a"),
            ],
        )
        .with_entry_point("c", vec![lock("lock_b"), store("state"), unlock("lock_b")])
        .build()
}

/// One unguarded writer and two pure readers of `config`. The location is
/// a candidate because of the writer, but the reader/reader pair has no
/// write on either side. Expected: races against `init` only.
pub fn fixture_readers_and_one_writer() -> Program {
    ProgramBuilder::new("drivers/misc/fake.c")
        .with_global("config")
        .with_entry_point("init", vec![store("config")])
        .with_entry_point("reader_a", vec![load("config")])
        .with_entry_point("reader_b", vec![load("config")])
        .build()
}

/// One side calls into an externally defined, unclassified function
/// before the access. Expected: the pair downgrades to unknown.
pub fn fixture_opaque_helper() -> Program {
    ProgramBuilder::new("drivers/usb/fake.c")
        .with_global("counter")
        .with_entry_point("ioctl", vec![call("usb_submit_urb"), store("counter")])
        .with_entry_point("write", vec![store("counter")])
        .build()
}

/// The guarded access happens inside a tagged helper, not in the entry
/// point body. Expected: the helper access still carries the caller's
/// lockset, so the unguarded side loses.
pub fn fixture_guard_through_helper() -> Program {
    ProgramBuilder::new("drivers/net/fake.c")
        .with_lock("dev_mutex")
        .with_entry_point(
            "ioctl",
            vec![lock("dev_mutex"), call("dev_reset"), unlock("dev_mutex")],
        )
        .with_procedure(
            ProcedureBuilder::new("dev_reset")
                .tagged("ioctl")
                .block("entry", vec![store("counter")], &[])
                .build(),
        )
        .with_entry_point("irq_handler", vec![store("counter")])
        .build()
}

/// An entry point whose branches acquire the lock on only one path, so
/// the join intersects away the guard. Expected: violated despite the
/// locked branch.
pub fn fixture_branch_drops_guard() -> Program {
    ProgramBuilder::new("drivers/block/fake.c")
        .with_lock("dev_mutex")
        .with_procedure(
            ProcedureBuilder::new("ioctl")
                .entry_point()
                .block("entry", vec![], &["locked", "bare"])
                .block("locked", vec![lock("dev_mutex")], &["join"])
                .block("bare", vec![], &["join"])
                .block("join", vec![store("counter")], &[])
                .build(),
        )
        .with_entry_point("write", vec![store("counter")])
        .build()
}

/// A serialized `.rir` unit: ioctl guards the counter, the IRQ handler
/// reads it bare. Parsing this and analysing it must report one race.
pub fn fixture_rir_json() -> String {
    r#"{
  "unit": "drivers/net/fake.c",
  "variables": [
    { "name": "dev_mutex", "attributes": { "flags": ["lock"] } }
  ],
  "procedures": [
    {
      "name": "ioctl",
      "attributes": { "flags": ["entrypoint"] },
      "blocks": [
        {
          "label": "entry",
          "instructions": [
            { "Call": { "callee": "mutex_lock", "args": [{ "Var": "dev_mutex" }] } },
            { "Store": { "location": "shared_counter", "value": { "Literal": 1 } } },
            { "Call": { "callee": "mutex_unlock", "args": [{ "Var": "dev_mutex" }] } }
          ]
        }
      ]
    },
    {
      "name": "irq_handler",
      "attributes": { "flags": ["entrypoint"] },
      "blocks": [
        {
          "label": "entry",
          "instructions": [
            { "Load": { "dest": "tmp", "location": "shared_counter" } }
          ]
        }
      ]
    }
  ]
}"#
    .to_string()
}
