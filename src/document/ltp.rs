use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use super::header::{Contributor, Reference, SetHeader};
use super::keyed::{KeyCompleteness, KeySource, PartialKeyed, VersionedDocument};
use crate::process::{Process, ProcessInfo, ReferenceRef};
use crate::species::{SerializedSpecies, Species};
use crate::validation::payload::{self, Context, FromPayload};
use crate::validation::FieldPath;

/// Entity that lists the sets it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetReferenced<T> {
    /// Keys into the mixture's `sets` map
    pub is_part_of: Vec<String>,
    /// The entity
    #[serde(flatten)]
    pub item: T,
}

impl<T: FromPayload> FromPayload for SetReferenced<T> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let is_part_of =
            payload::required(map, "isPartOf", path, ctx).and_then(|v| payload::string_list(v, &path.field("isPartOf"), ctx));
        let item = T::from_payload(value, path, ctx);
        Some(SetReferenced {
            is_part_of: is_part_of?,
            item: item?,
        })
    }
}

impl<T: KeyCompleteness> KeyCompleteness for SetReferenced<T> {
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>) {
        self.item.collect_unresolved(path, unresolved);
    }
}

impl<C> KeyCompleteness for SetHeader<C> {
    fn collect_unresolved(&self, _path: &FieldPath, _unresolved: &mut Vec<FieldPath>) {}
}

impl<R> KeyCompleteness for ProcessInfo<R> {
    fn collect_unresolved(&self, _path: &FieldPath, _unresolved: &mut Vec<FieldPath>) {}
}

/// References, states and the processes between them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LtpBody<St, I> {
    /// Bibliographic records by key
    pub references: BTreeMap<String, Reference>,
    /// States by key
    pub states: BTreeMap<String, St>,
    /// Processes; reaction entries refer to `states` keys
    pub processes: Vec<Process<String, I>>,
}

impl<St, I> LtpBody<St, I> {
    /// Every `(path, info)` pair, e.g. `processes[1].info[0]`.
    pub fn infos(&self) -> impl Iterator<Item = (FieldPath, &I)> {
        self.processes.iter().enumerate().flat_map(|(p, process)| {
            process
                .info
                .iter()
                .enumerate()
                .map(move |(i, info)| (FieldPath::root().field("processes").index(p).field("info").index(i), info))
        })
    }
}

impl<St, I> LtpBody<St, PartialKeyed<I>> {
    /// Key every process info that has no key yet.
    pub fn assign_keys(&mut self, keys: &mut dyn KeySource) {
        for process in &mut self.processes {
            for info in &mut process.info {
                info.assign_key(keys);
            }
        }
    }
}

impl<St, I: KeyCompleteness> KeyCompleteness for LtpBody<St, I> {
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>) {
        for (p, process) in self.processes.iter().enumerate() {
            let info_path = path.field("processes").index(p).field("info");
            for (i, info) in process.info.iter().enumerate() {
                info.collect_unresolved(&info_path.index(i), unresolved);
            }
        }
    }
}

impl<St: FromPayload, I: FromPayload> FromPayload for LtpBody<St, I> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let references = payload::required(map, "references", path, ctx)
            .and_then(|v| payload::record(v, &path.field("references"), ctx, Reference::from_payload));
        let states =
            payload::required(map, "states", path, ctx).and_then(|v| payload::record(v, &path.field("states"), ctx, St::from_payload));
        let processes_path = path.field("processes");
        let processes = payload::required(map, "processes", path, ctx)
            .and_then(|v| payload::array(v, &processes_path, ctx))
            .and_then(|items| payload::each(items, &processes_path, ctx, Process::<String, I>::from_payload));
        Some(LtpBody {
            references: references?,
            states: states?,
            processes: processes?,
        })
    }
}

/// A single dataset: header plus body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LtpSet<C, St, I> {
    /// Descriptive header
    #[serde(flatten)]
    pub header: SetHeader<C>,
    /// References, states and processes
    #[serde(flatten)]
    pub body: LtpBody<St, I>,
}

impl<C, St, I: KeyCompleteness> KeyCompleteness for LtpSet<C, St, I> {
    fn collect_unresolved(&self, path: &FieldPath, unresolved: &mut Vec<FieldPath>) {
        self.body.collect_unresolved(path, unresolved);
    }
}

impl<C: FromPayload, St: FromPayload, I: FromPayload> FromPayload for LtpSet<C, St, I> {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let header = SetHeader::<C>::from_payload(value, path, ctx);
        let body = LtpBody::<St, I>::from_payload(value, path, ctx);
        Some(LtpSet {
            header: header?,
            body: body?,
        })
    }
}

/// Process info as authored: citations by reference key.
pub type AuthoredInfo = ProcessInfo<ReferenceRef>;

/// Freshly uploaded dataset; carries no keys or version information.
pub type NewLtpDocument = LtpSet<String, Species, AuthoredInfo>;

/// Content of a draft: process infos keep their keys from earlier versions
/// and new ones are keyed on publication.
pub type DraftContent = LtpSet<String, Species, PartialKeyed<AuthoredInfo>>;

/// Update of an existing dataset; the set and its process infos may carry keys.
pub type EditedLtpDocument = PartialKeyed<DraftContent>;

/// Stored process info of a dataset.
pub type VersionedInfo = VersionedDocument<AuthoredInfo>;

/// Stored dataset with cached species renderings and versioned process infos.
pub type LtpDocument = VersionedDocument<LtpSet<Contributor, SerializedSpecies, VersionedInfo>>;

/// Stored process info as it appears in a mixture, with its set memberships.
pub type MixtureInfo = VersionedDocument<SetReferenced<AuthoredInfo>>;

/// Processes drawn from several datasets.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LtpMixture {
    /// Stored set headers by key
    pub sets: BTreeMap<String, VersionedDocument<SetHeader<Contributor>>>,
    /// References, states and processes
    #[serde(flatten)]
    pub body: LtpBody<SerializedSpecies, MixtureInfo>,
}

impl FromPayload for LtpMixture {
    fn from_payload(value: &Value, path: &FieldPath, ctx: &mut Context<'_>) -> Option<Self> {
        let map = payload::object(value, path, ctx)?;
        let sets = payload::required(map, "sets", path, ctx).and_then(|v| {
            payload::record(v, &path.field("sets"), ctx, VersionedDocument::<SetHeader<Contributor>>::from_payload)
        });
        let body = LtpBody::from_payload(value, path, ctx);
        Some(LtpMixture {
            sets: sets?,
            body: body?,
        })
    }
}
