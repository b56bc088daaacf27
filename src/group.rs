/// Student codes of the members of our group.
pub const GROUP_CODES: [&str; 4] = [
    "202310254018",
    "202410029018",
    "202410166018",
    "202320065018",
];
