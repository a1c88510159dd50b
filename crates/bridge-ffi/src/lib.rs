//! C ABI over the compiled programs.
//!
//! Every object crosses the boundary as an opaque `u64` handle; `0` means
//! "absent" and is only ever returned by lookups that found nothing. Handles
//! are resolved against one process-global registry on every call, so a
//! stale handle is detected instead of dereferenced. Each handle is tagged
//! with its kind, so passing a tuple where an iterator is expected is caught
//! the same way.
//!
//! Misuse is fatal. A destroyed or unknown handle, a handle of the wrong
//! kind, a tuple inserted into the wrong relation, a schema mismatch,
//! advancing or reading past the end, a read of the wrong field type, a
//! relation modified while an iterator over it is open, and a failed
//! evaluation are logged and then raised as a panic that unwinds out of the
//! `C-unwind` call. Hosts that cannot unwind should abort on it.
//!
//! Calls are serialised by the registry lock, evaluation included.
//!
//! The matching declarations live in `include/datalog_bridge.h`.

use std::ffi::{CStr, CString, c_char};
use std::sync::LazyLock;

use bridge_engine::Value;
use parking_lot::{Mutex, MutexGuard};

#[macro_use]
mod registry;
mod handle;

use registry::Registry;

static REGISTRY: LazyLock<Mutex<Registry>> = LazyLock::new(|| {
    bridge_programs::install();
    Mutex::new(Registry::default())
});

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock()
}

/// Borrow a NUL-terminated UTF-8 string from the caller.
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string that stays valid
/// for the duration of the call.
unsafe fn text<'a>(ptr: *const c_char, what: &str) -> &'a str {
    if ptr.is_null() {
        violation!("{what} is a null pointer");
    }
    // SAFETY: non-null and NUL-terminated per the caller contract.
    let raw = unsafe { CStr::from_ptr(ptr) };
    match raw.to_str() {
        Ok(s) => s,
        Err(err) => violation!("{what} is not valid UTF-8: {err}"),
    }
}

// ─── Programs ───────────────────────────────────────────────────────────────

/// Create an instance of a compiled program.
///
/// Returns 0 if no program is registered under `name`.
///
/// # Safety
///
/// `name` must point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn dlb_program_create(name: *const c_char) -> u64 {
    // SAFETY: forwarded caller contract.
    let name = unsafe { text(name, "program name") };
    registry().create_program(name)
}

/// Run a program to fixpoint.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_program_run(program: u64) {
    registry().run(program);
}

/// Clear input, internal and output relations, in that order.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_program_purge(program: u64) {
    registry().purge(program);
}

/// Destroy a program. Every relation, tuple and iterator handle derived from
/// it becomes stale.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_program_free(program: u64) {
    registry().free_program(program);
}

/// Look up a relation by name. Returns 0 if the program has none by that name.
///
/// # Safety
///
/// `name` must point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn dlb_program_relation(program: u64, name: *const c_char) -> u64 {
    // SAFETY: forwarded caller contract.
    let name = unsafe { text(name, "relation name") };
    registry().relation(program, name)
}

// ─── Relations and write tuples ─────────────────────────────────────────────

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_relation_size(relation: u64) -> u64 {
    registry().relation_size(relation)
}

/// Insert a tuple created for this relation. Consumes the tuple handle.
///
/// Returns false if an equal tuple was already present.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_relation_insert(relation: u64, tuple: u64) -> bool {
    registry().insert(relation, tuple)
}

/// Create an empty tuple for insertion into `relation`.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_create(relation: u64) -> u64 {
    registry().create_tuple(relation)
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_append_number(tuple: u64, value: u32) {
    registry().append(tuple, Value::Unsigned(value));
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_append_signed(tuple: u64, value: i32) {
    registry().append(tuple, Value::Signed(value));
}

/// Append a symbol. The text is copied.
///
/// # Safety
///
/// `value` must point to a NUL-terminated string.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn dlb_tuple_append_text(tuple: u64, value: *const c_char) {
    // SAFETY: forwarded caller contract.
    let value = unsafe { text(value, "symbol") };
    registry().append(tuple, Value::symbol(value));
}

/// Abandon a tuple that will not be inserted.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_free(tuple: u64) {
    registry().free_tuple(tuple);
}

// ─── Iterators and read tuples ──────────────────────────────────────────────

/// Open an iterator positioned before the first tuple of `relation`.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_iterator_create(relation: u64) -> u64 {
    registry().create_iterator(relation)
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_iterator_has_next(iterator: u64) -> bool {
    registry().has_next(iterator)
}

/// Advance and return a read handle for the next tuple. The previous read
/// handle of this iterator becomes stale.
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_iterator_next(iterator: u64) -> u64 {
    registry().next(iterator)
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_iterator_free(iterator: u64) {
    registry().free_iterator(iterator);
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_read_number(read: u64) -> u32 {
    match registry().read(read) {
        Value::Unsigned(n) => n,
        other => violation!("read {} field as unsigned", other.kind()),
    }
}

#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_read_signed(read: u64) -> i32 {
    match registry().read(read) {
        Value::Signed(n) => n,
        other => violation!("read {} field as number", other.kind()),
    }
}

/// Read a symbol as a newly allocated string, released with
/// [`dlb_string_free`].
#[unsafe(no_mangle)]
pub extern "C-unwind" fn dlb_tuple_read_text(read: u64) -> *mut c_char {
    let value = registry().read(read);
    let Some(symbol) = value.as_symbol() else {
        violation!("read {} field as symbol", value.kind());
    };
    match CString::new(symbol) {
        Ok(s) => s.into_raw(),
        Err(err) => violation!("symbol cannot cross as a C string: {err}"),
    }
}

/// Release a string returned by [`dlb_tuple_read_text`]. Null is ignored.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by `dlb_tuple_read_text` that has
/// not been freed.
#[unsafe(no_mangle)]
pub unsafe extern "C-unwind" fn dlb_string_free(ptr: *mut c_char) {
    if ptr.is_null() {
        return;
    }
    // SAFETY: allocated by `CString::into_raw` per the caller contract.
    drop(unsafe { CString::from_raw(ptr) });
}
