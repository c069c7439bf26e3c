use futures::future::try_join_all;
use tracing::warn;

use crate::database::models::{Cctv, CctvWithContact, Contact, ContactWithCctvs};
use crate::database::{Collection, Lookup, Repository};
use crate::services::ServiceError;

/// Attach every CCTV whose `contact_id` matches the contact, as `cctvs`.
pub const CONTACT_CCTVS: Lookup = Lookup {
    from: Collection::Cctvs,
    local_field: "contact_id",
    foreign_field: "contact_id",
    as_field: "cctvs",
};

/// Resolve the owning contact of each CCTV, one lookup per CCTV, concurrently.
///
/// The embedded contact never carries its own CCTV list.
pub async fn attach_contacts(
    contacts: &Repository<Contact>,
    cctvs: Vec<Cctv>,
) -> Result<Vec<CctvWithContact>, ServiceError> {
    let found = try_join_all(cctvs.iter().map(|cctv| contacts.find_by_id(&cctv.contact_id))).await?;

    Ok(cctvs
        .into_iter()
        .zip(found)
        .map(|(cctv, contact)| {
            if contact.is_none() {
                warn!("Cctv {} references missing contact {}", cctv.cctv_id, cctv.contact_id);
            }
            CctvWithContact { cctv, contact: contact.map(ContactWithCctvs::from) }
        })
        .collect())
}
