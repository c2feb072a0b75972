//! Integration tests for adapters_term_engine crate
//!
//! These tests drive the engine through its public surface: building terms,
//! pinning them with reference counts, collecting, and recovering from an
//! allocation failure raised through the out-of-memory hook.

use adapters_term_engine::*;
use entities_data_handling::{ErrorCode, NativeAddress};
use std::panic::{self, AssertUnwindSafe};
use usecases_memory_management::{set_out_of_memory_hook, Allocator};

struct EngineOutOfMemory;

fn unwind_on_out_of_memory() -> ! {
    panic::panic_any(EngineOutOfMemory)
}

#[test]
fn test_predefined_handles() {
    let engine = TermEngine::new();
    assert_eq!(engine.bool_type(), BOOL_TYPE);
    assert_eq!(engine.int_type(), INT_TYPE);
    assert_eq!(engine.real_type(), REAL_TYPE);
    assert_eq!(engine.mk_true(), TRUE_TERM);
    assert_eq!(engine.mk_false(), FALSE_TERM);
    assert_eq!(engine.type_of_term(TRUE_TERM).unwrap(), BOOL_TYPE);
}

#[test]
fn test_handles_are_reused_after_collection() {
    let mut engine = TermEngine::new();
    let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
    engine.collect(&[], &[], false);
    assert!(!engine.is_valid_term(x));

    let y = engine.new_uninterpreted_term(REAL_TYPE).unwrap();
    assert_eq!(y, x);
    assert_eq!(engine.type_of_term(y).unwrap(), REAL_TYPE);
}

#[test]
fn test_hash_consing_survives_reclaim() {
    let mut engine = TermEngine::new();
    let seven = engine.int_constant(7);
    engine.collect(&[], &[], false);
    assert!(!engine.is_valid_term(seven));

    let again = engine.int_constant(7);
    assert!(engine.is_valid_term(again));
    assert_eq!(
        engine.rational_const_value(again).unwrap(),
        entities_utilities::BigRational::from_i64(7)
    );
}

#[test]
fn test_roots_keep_children_and_types_alive() {
    let mut engine = TermEngine::new();
    let bv = engine.bv_type(16).unwrap();
    let x = engine.new_uninterpreted_term(bv).unwrap();
    let y = engine.new_uninterpreted_term(bv).unwrap();
    let eq = engine.eq(x, y).unwrap();

    let stats = engine.collect(&[eq], &[], false);
    assert_eq!(stats.terms_reclaimed, 0);
    assert!(engine.is_valid_term(x));
    assert!(engine.is_valid_type(bv));

    engine.collect(&[], &[], false);
    assert!(!engine.is_valid_term(eq));
    assert!(!engine.is_valid_type(bv));
}

#[test]
fn test_invalid_roots_are_ignored() {
    let mut engine = TermEngine::new();
    let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
    let stats = engine.collect(&[-1, 99_999, x], &[-7], false);
    assert_eq!(stats.terms_reclaimed, 0);
    assert!(engine.is_valid_term(x));
}

#[test]
fn test_type_refcounts() {
    let mut engine = TermEngine::new();
    let s = engine.new_uninterpreted_type();
    engine.incref_type(s).unwrap();
    engine.collect(&[], &[], false);
    assert!(engine.is_valid_type(s));
    assert_eq!(engine.num_posref_types(), 1);

    engine.decref_type(s).unwrap();
    engine.collect(&[], &[], false);
    assert!(!engine.is_valid_type(s));
    assert_eq!(engine.num_types(), 3);
}

#[test]
fn test_type_names() {
    let mut engine = TermEngine::new();
    let s = engine.new_uninterpreted_type();
    engine.set_type_name(s, "S").unwrap();
    assert_eq!(engine.get_type_by_name("S"), Some(s));
    assert_eq!(engine.get_type_name(s), Some("S"));
    engine.remove_type_name("S");
    assert_eq!(engine.get_type_by_name("S"), None);
    assert_eq!(engine.get_type_name(s), Some("S"));
    engine.clear_type_name(s).unwrap();
    assert_eq!(engine.get_type_name(s), None);
}

#[test]
fn test_error_reporting_through_record() {
    let mut engine = TermEngine::new();
    let result = engine.bv_type(0);
    assert_eq!(engine.record(result), None);
    assert_eq!(engine.error_code(), ErrorCode::PosIntRequired.code());
    assert!(!engine.error_string().is_empty());
    engine.clear_error();
    assert_eq!(engine.error_code(), 0);
}

#[test]
fn test_out_of_memory_leaves_engine_usable() {
    let previous = set_out_of_memory_hook(Some(unwind_on_out_of_memory));

    let mut engine = TermEngine::new();
    let x = engine.new_uninterpreted_term(INT_TYPE).unwrap();
    let terms_before = engine.num_terms();
    let in_use_before = engine.allocator().in_use();

    engine.allocator_mut().inject_failure(0);
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        engine.new_uninterpreted_term(INT_TYPE)
    }));
    let payload = outcome.unwrap_err();
    assert!(payload.is::<EngineOutOfMemory>());

    assert_eq!(engine.num_terms(), terms_before);
    assert_eq!(engine.allocator().in_use(), in_use_before);

    let y = engine.new_uninterpreted_term(INT_TYPE).unwrap();
    assert_ne!(x, y);
    let ctx = engine.new_context(NativeAddress::NULL).unwrap();
    assert!(!ctx.is_null());

    set_out_of_memory_hook(previous);
}
