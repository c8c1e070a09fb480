use super::*;
use crate::nodes::{ListType, NodeValue};

#[test]
fn checkboxes() {
    html_opts!(
        [gfm_task_list_item],
        "- [x] Done\n- [ ] Not done\n",
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> Done</li>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> Not done</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn uppercase_x_counts_as_checked() {
    html_opts!(
        [gfm_task_list_item],
        "- [X] shouty\n",
        "<ul>\n<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> shouty</li>\n</ul>\n",
    );
}

#[test]
fn marker_needs_following_whitespace() {
    html_opts!(
        [gfm_task_list_item],
        "- [x]nope\n",
        "<ul>\n<li>[x]nope</li>\n</ul>\n",
    );
}

#[test]
fn list_metadata_flips_to_task() {
    let arena = Arena::new();
    let mut options = Options::default();
    options.gfm_task_list_item = true;
    let root = parse_document(&arena, "- [ ] a\n", &options);

    let list = root
        .descendants()
        .find(|n| matches!(n.data.borrow().value, NodeValue::List(..)))
        .unwrap();
    match list.data.borrow().value {
        NodeValue::List(ref nl) => assert_eq!(nl.typ, ListType::Task),
        _ => unreachable!(),
    };
}

#[test]
fn three_items_stay_one_list() {
    html_opts!(
        [gfm_task_list_item],
        "- [x] a\n- [ ] b\n- [x] c\n",
        concat!(
            "<ul>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> a</li>\n",
            "<li><input type=\"checkbox\" disabled=\"\" /> b</li>\n",
            "<li><input type=\"checkbox\" checked=\"\" disabled=\"\" /> c</li>\n",
            "</ul>\n"
        ),
    );
}

#[test]
fn task_markers_need_the_option() {
    html(
        "- [x] Done\n",
        "<ul>\n<li>[x] Done</li>\n</ul>\n",
    );
}
