//! Declarative macros for ergonomic effect construction

/// Create an `Effect::Storage` with a `Save` operation
///
/// # Example
///
/// ```rust,ignore
/// use hotel_ops_core::save_documents;
///
/// save_documents! {
///     store: env.storage,
///     documents: vec![("demo_parts".to_string(), json)],
///     on_success: || None,
///     on_error: |error| Some(LedgerAction::PersistenceFailed { error: error.to_string() })
/// }
/// ```
#[macro_export]
macro_rules! save_documents {
    (
        store: $store:expr,
        documents: $documents:expr,
        on_success: || $success_body:expr,
        on_error: |$error_param:ident| $error_body:expr
    ) => {
        $crate::effect::Effect::Storage($crate::effect::StorageOperation::Save {
            store: ::std::sync::Arc::clone(&$store),
            documents: $documents,
            on_success: ::std::boxed::Box::new(move || $success_body),
            on_error: ::std::boxed::Box::new(move |$error_param| $error_body),
        })
    };
}

/// Create an `Effect::Delay` that dispatches `action` after `duration`
///
/// # Example
///
/// ```rust,ignore
/// use hotel_ops_core::delay;
///
/// delay! {
///     duration: Duration::from_millis(400),
///     action: LedgerAction::ConfirmPurchaseOrderReceipt { po_id }
/// }
/// ```
#[macro_export]
macro_rules! delay {
    (
        duration: $duration:expr,
        action: $action:expr
    ) => {
        $crate::effect::Effect::Delay {
            duration: $duration,
            action: ::std::boxed::Box::new($action),
        }
    };
}
