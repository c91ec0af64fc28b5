//! Document-level validation: the cross-record invariants a structurally
//! well-formed tree must still satisfy.
//!
//! Checks run depth-first, leaves first: bundle invariants before
//! cash-letter invariants before file invariants, so the first error
//! reported is the most local one.

use crate::charset::Charset;
use crate::error::{FieldError, FieldReason, IclError, Structure};
use crate::field::num;
use crate::records::Record;
use crate::{Bundle, CashLetter, File};

/// Knobs for [`File::validate_with`].
#[derive(Debug, Clone)]
pub struct ValidationOptions {
    /// Charset bound on alphanumeric fields. Defaults to strict ASCII.
    pub charset: Charset,

    /// Downgrade empty bundles (and bundle-less cash letters) from errors
    /// to warnings.
    pub allow_empty_bundles: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        ValidationOptions {
            charset: Charset::Ascii,
            allow_empty_bundles: false,
        }
    }
}

pub(crate) fn validate_file(file: &File, opts: &ValidationOptions) -> Result<(), IclError> {
    for cash_letter in &file.cash_letters {
        validate_cash_letter(cash_letter, opts)?;
    }

    file.header.validate(opts.charset)?;
    file.control.validate(opts.charset)?;

    let mismatch = |field, expected: u64, actual: &str| {
        Err(IclError::File {
            field,
            reason: Structure::Mismatch {
                expected: expected.to_string(),
                actual: num(actual).to_string(),
            },
        })
    };

    let cash_letters = file.cash_letters.len() as u64;
    if num(&file.control.cash_letter_count) != cash_letters {
        return mismatch("CashLetterCount", cash_letters, &file.control.cash_letter_count);
    }

    let items: u64 = file.cash_letters.iter().map(cash_letter_items).sum();
    if num(&file.control.total_item_count) != items {
        return mismatch("TotalItemCount", items, &file.control.total_item_count);
    }

    let amount: u64 = file.cash_letters.iter().map(cash_letter_amount).sum();
    if num(&file.control.file_total_amount) != amount {
        return mismatch("FileTotalAmount", amount, &file.control.file_total_amount);
    }

    // The record count is absent in some dialects; zero means unstated.
    let declared_records = num(&file.control.total_record_count);
    if declared_records != 0 && declared_records != file.record_count() as u64 {
        return mismatch(
            "TotalRecordCount",
            file.record_count() as u64,
            &file.control.total_record_count,
        );
    }

    Ok(())
}

fn validate_cash_letter(
    cash_letter: &CashLetter,
    opts: &ValidationOptions,
) -> Result<(), IclError> {
    let id = || cash_letter.header.cash_letter_id.clone();

    for bundle in &cash_letter.bundles {
        validate_bundle(bundle, cash_letter, opts)?;
    }

    cash_letter.header.validate(opts.charset)?;
    for item in &cash_letter.credit_items {
        item.validate(opts.charset)?;
    }
    cash_letter.control.validate(opts.charset)?;

    if cash_letter.bundles.is_empty() {
        if opts.allow_empty_bundles {
            log::warn!("cash letter {} has no bundles", id());
        } else {
            return Err(IclError::CashLetter {
                id: id(),
                field: "bundles",
                reason: Structure::Entries,
            });
        }
    }

    let mismatch = |field, expected: u64, actual: &str| {
        Err(IclError::CashLetter {
            id: id(),
            field,
            reason: Structure::Mismatch {
                expected: expected.to_string(),
                actual: num(actual).to_string(),
            },
        })
    };

    let bundles = cash_letter.bundles.len() as u64;
    if num(&cash_letter.control.bundle_count) != bundles {
        return mismatch("BundleCount", bundles, &cash_letter.control.bundle_count);
    }

    let items = cash_letter_items(cash_letter);
    if num(&cash_letter.control.cash_letter_items_count) != items {
        return mismatch(
            "CashLetterItemsCount",
            items,
            &cash_letter.control.cash_letter_items_count,
        );
    }

    let amount = cash_letter_amount(cash_letter);
    if num(&cash_letter.control.cash_letter_total_amount) != amount {
        return mismatch(
            "CashLetterTotalAmount",
            amount,
            &cash_letter.control.cash_letter_total_amount,
        );
    }

    // Image counts are informational in some exchanges; only a stated
    // count is held to the tree.
    let declared_images = num(&cash_letter.control.cash_letter_images_count);
    let images: u64 = cash_letter.bundles.iter().map(bundle_images).sum();
    if declared_images != 0 && declared_images != images {
        return mismatch(
            "CashLetterImagesCount",
            images,
            &cash_letter.control.cash_letter_images_count,
        );
    }

    Ok(())
}

fn validate_bundle(
    bundle: &Bundle,
    cash_letter: &CashLetter,
    opts: &ValidationOptions,
) -> Result<(), IclError> {
    let id = || bundle.header.bundle_id.clone();
    let bundle_err = |field, reason| {
        Err(IclError::Bundle {
            id: id(),
            field,
            reason,
        })
    };

    bundle.header.validate(opts.charset)?;

    if !bundle.checks.is_empty() && !bundle.returns.is_empty() {
        return bundle_err("entries", Structure::MixedBundle);
    }
    if bundle.checks.is_empty() && bundle.returns.is_empty() {
        if opts.allow_empty_bundles {
            log::warn!("bundle {} has no items", id());
        } else {
            return bundle_err("entries", Structure::Entries);
        }
    }

    for check in &bundle.checks {
        check.validate(opts.charset)?;
        for addendum in &check.addendum_a {
            addendum.validate(opts.charset)?;
        }
        for addendum in &check.addendum_b {
            addendum.validate(opts.charset)?;
        }
        for addendum in &check.addendum_c {
            addendum.validate(opts.charset)?;
        }
        validate_item_counts(
            &id,
            &check.addendum_count,
            check.addendum_a.len(),
            &check.image_view_count,
            check.image_views.len(),
        )?;
        validate_views(&check.image_views, opts)?;
    }
    for detail in &bundle.returns {
        detail.validate(opts.charset)?;
        for addendum in &detail.addendum_a {
            addendum.validate(opts.charset)?;
        }
        for addendum in &detail.addendum_b {
            addendum.validate(opts.charset)?;
        }
        for addendum in &detail.addendum_c {
            addendum.validate(opts.charset)?;
        }
        for addendum in &detail.addendum_d {
            addendum.validate(opts.charset)?;
        }
        validate_item_counts(
            &id,
            &detail.addendum_count,
            detail.addendum_a.len(),
            &detail.image_view_count,
            detail.image_views.len(),
        )?;
        validate_views(&detail.image_views, opts)?;
    }

    bundle.control.validate(opts.charset)?;

    let mismatch = |field, expected: u64, actual: &str| {
        Err(IclError::Bundle {
            id: id(),
            field,
            reason: Structure::Mismatch {
                expected: expected.to_string(),
                actual: num(actual).to_string(),
            },
        })
    };

    let items = (bundle.checks.len() + bundle.returns.len()) as u64;
    if num(&bundle.control.items_count) != items {
        return mismatch("ItemsCount", items, &bundle.control.items_count);
    }

    let amount = bundle_amount(bundle);
    if num(&bundle.control.bundle_total_amount) != amount {
        return mismatch("BundleTotalAmount", amount, &bundle.control.bundle_total_amount);
    }

    let declared_images = num(&bundle.control.images_within_bundle_count);
    let images = bundle_images(bundle);
    if declared_images != 0 && declared_images != images {
        return mismatch(
            "ImagesWithinBundleCount",
            images,
            &bundle.control.images_within_bundle_count,
        );
    }

    // Routing numbers within a cash letter must agree with its header.
    let routing_match = |field, parent: &str, child: &str| {
        if !parent.is_empty() && !child.is_empty() && parent != child {
            Err(IclError::Bundle {
                id: id(),
                field,
                reason: Structure::Mismatch {
                    expected: parent.to_string(),
                    actual: child.to_string(),
                },
            })
        } else {
            Ok(())
        }
    };
    routing_match(
        "DestinationRoutingNumber",
        &cash_letter.header.destination_routing_number,
        &bundle.header.destination_routing_number,
    )?;
    routing_match(
        "EceInstitutionRoutingNumber",
        &cash_letter.header.ece_institution_routing_number,
        &bundle.header.ece_institution_routing_number,
    )?;

    Ok(())
}

fn validate_item_counts(
    id: &dyn Fn() -> String,
    addendum_count: &str,
    addenda: usize,
    image_view_count: &str,
    views: usize,
) -> Result<(), IclError> {
    // AddendumA is the canonically counted addendum.
    if num(addendum_count) != addenda as u64 {
        return Err(IclError::Bundle {
            id: id(),
            field: "AddendumCount",
            reason: Structure::Mismatch {
                expected: (addenda as u64).to_string(),
                actual: num(addendum_count).to_string(),
            },
        });
    }
    if num(image_view_count) != views as u64 {
        return Err(IclError::Bundle {
            id: id(),
            field: "ImageViewCount",
            reason: Structure::Mismatch {
                expected: (views as u64).to_string(),
                actual: num(image_view_count).to_string(),
            },
        });
    }
    Ok(())
}

fn validate_views(
    views: &[crate::ImageView],
    opts: &ValidationOptions,
) -> Result<(), IclError> {
    for view in views {
        view.detail.validate(opts.charset)?;
        match &view.data {
            Some(data) => data.validate(opts.charset)?,
            None => {
                return Err(FieldError {
                    field: "ImageViewData",
                    value: String::new(),
                    reason: FieldReason::FieldInclusion,
                }
                .into());
            }
        }
        if let Some(analysis) = &view.analysis {
            analysis.validate(opts.charset)?;
        }
    }
    Ok(())
}

pub(crate) fn bundle_amount(bundle: &Bundle) -> u64 {
    let checks: u64 = bundle.checks.iter().map(|c| num(&c.item_amount)).sum();
    let returns: u64 = bundle.returns.iter().map(|r| num(&r.item_amount)).sum();
    checks + returns
}

pub(crate) fn bundle_images(bundle: &Bundle) -> u64 {
    let checks: u64 = bundle.checks.iter().map(|c| c.image_views.len() as u64).sum();
    let returns: u64 = bundle.returns.iter().map(|r| r.image_views.len() as u64).sum();
    checks + returns
}

pub(crate) fn cash_letter_items(cash_letter: &CashLetter) -> u64 {
    cash_letter
        .bundles
        .iter()
        .map(|b| (b.checks.len() + b.returns.len()) as u64)
        .sum()
}

pub(crate) fn cash_letter_amount(cash_letter: &CashLetter) -> u64 {
    cash_letter.bundles.iter().map(bundle_amount).sum()
}

/// Rewrite every control record, and the per-item addendum and image view
/// counts, from the tree they summarize.
pub(crate) fn recompute_controls(file: &mut File) {
    for cash_letter in &mut file.cash_letters {
        for bundle in &mut cash_letter.bundles {
            let mut micr_valid: u64 = 0;
            for check in &mut bundle.checks {
                check.addendum_count = check.addendum_a.len().to_string();
                check.image_view_count = check.image_views.len().to_string();
                if check.micr_valid_indicator == "1" {
                    micr_valid += num(&check.item_amount);
                }
            }
            for detail in &mut bundle.returns {
                detail.addendum_count = detail.addendum_a.len().to_string();
                detail.image_view_count = detail.image_views.len().to_string();
            }

            bundle.control.items_count =
                (bundle.checks.len() + bundle.returns.len()).to_string();
            bundle.control.bundle_total_amount = bundle_amount(bundle).to_string();
            bundle.control.micr_valid_total_amount = micr_valid.to_string();
            bundle.control.images_within_bundle_count = bundle_images(bundle).to_string();
        }

        cash_letter.control.bundle_count = cash_letter.bundles.len().to_string();
        cash_letter.control.cash_letter_items_count =
            cash_letter_items(cash_letter).to_string();
        cash_letter.control.cash_letter_total_amount =
            cash_letter_amount(cash_letter).to_string();
        cash_letter.control.cash_letter_images_count = cash_letter
            .bundles
            .iter()
            .map(bundle_images)
            .sum::<u64>()
            .to_string();
    }

    file.control.cash_letter_count = file.cash_letters.len().to_string();
    file.control.total_item_count = file
        .cash_letters
        .iter()
        .map(cash_letter_items)
        .sum::<u64>()
        .to_string();
    file.control.file_total_amount = file
        .cash_letters
        .iter()
        .map(cash_letter_amount)
        .sum::<u64>()
        .to_string();
    file.control.total_record_count = file.record_count().to_string();
}
