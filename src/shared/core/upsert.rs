// Upsert by id into an ordered collection.
//
// Both the ticket list (newest first) and the time-block list (append order)
// are kept with this one primitive so that replaying the same mutation never
// duplicates a record.

pub trait Identified {
    fn id(&self) -> &str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Inserted,
    Replaced,
}

/// Replaces the item with the same id in place, otherwise inserts at `placement`.
pub fn upsert_by_id<T: Identified>(items: &mut Vec<T>, item: T, placement: Placement) -> Upserted {
    match items.iter().position(|existing| existing.id() == item.id()) {
        Some(index) => {
            items[index] = item;
            Upserted::Replaced
        }
        None => {
            match placement {
                Placement::Front => items.insert(0, item),
                Placement::Back => items.push(item),
            }
            Upserted::Inserted
        }
    }
}

pub fn find_by_id<'a, T: Identified>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|item| item.id() == id)
}
