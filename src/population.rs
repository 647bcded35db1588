use std::fmt;

/// Opaque handle to a person in a [`Population`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PersonId(u32);

impl PersonId {
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a person entered the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Founder,
    Spouse,
    Child,
}

/// A generated person before it has an identity in the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct PersonDraft {
    pub birth_year: i32,
    pub death_year: Option<i32>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_descendant: bool,
}

#[derive(Debug, Clone)]
pub struct Person {
    id: PersonId,
    origin: Origin,
    birth_year: i32,
    death_year: Option<i32>,
    first_name: Option<String>,
    last_name: Option<String>,
    is_descendant: bool,
    spouse: Option<PersonId>,
    children: Vec<PersonId>,
    parents: Vec<PersonId>,
    attempted_children: bool,
}

impl Person {
    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn birth_year(&self) -> i32 {
        self.birth_year
    }

    pub fn death_year(&self) -> Option<i32> {
        self.death_year
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    /// "First Last", with `Unknown` standing in for a missing part.
    pub fn full_name(&self) -> String {
        format!(
            "{} {}",
            self.first_name().unwrap_or("Unknown"),
            self.last_name().unwrap_or("Unknown")
        )
    }

    pub fn is_descendant(&self) -> bool {
        self.is_descendant
    }

    pub fn spouse(&self) -> Option<PersonId> {
        self.spouse
    }

    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    pub fn parents(&self) -> &[PersonId] {
        &self.parents
    }

    pub fn has_attempted_children(&self) -> bool {
        self.attempted_children
    }

    pub(crate) fn mark_children_attempted(&mut self) {
        self.attempted_children = true;
    }

    pub(crate) fn mark_descendant(&mut self) {
        self.is_descendant = true;
    }

    pub fn is_alive_in(&self, year: i32) -> bool {
        self.birth_year <= year && self.death_year.map_or(true, |died| died >= year)
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.full_name(), self.birth_year)
    }
}

/// Every person generated in one run, in creation order.
///
/// Identities are handed out once, at registration, so a person can never
/// be counted twice.
#[derive(Debug, Default, Clone)]
pub struct Population {
    people: Vec<Person>,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, draft: PersonDraft, origin: Origin) -> PersonId {
        let id = self.allocate();
        self.people.push(Person {
            id,
            origin,
            birth_year: draft.birth_year,
            death_year: draft.death_year,
            first_name: draft.first_name,
            last_name: draft.last_name,
            is_descendant: draft.is_descendant,
            spouse: None,
            children: Vec::new(),
            parents: Vec::new(),
            attempted_children: false,
        });
        id
    }

    pub fn get(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.0 as usize)
    }

    pub(crate) fn get_mut(&mut self, id: PersonId) -> Option<&mut Person> {
        self.people.get_mut(id.0 as usize)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    /// Sets the spouse relation on both sides. Either side already being
    /// married, or an unknown id, leaves the registry untouched.
    pub(crate) fn marry(&mut self, a: PersonId, b: PersonId) -> bool {
        if a == b {
            return false;
        }
        let free = |id| self.get(id).map_or(false, |p: &Person| p.spouse.is_none());
        if !free(a) || !free(b) {
            return false;
        }
        for (person, spouse) in [(a, b), (b, a)] {
            if let Some(p) = self.get_mut(person) {
                p.spouse = Some(spouse);
            }
        }
        true
    }

    pub(crate) fn add_child(&mut self, parent: PersonId, child: PersonId) {
        if let Some(p) = self.get_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.get_mut(child) {
            c.parents.push(parent);
        }
    }

    fn allocate(&self) -> PersonId {
        PersonId(self.people.len() as u32)
    }
}
