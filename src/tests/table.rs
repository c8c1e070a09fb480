use super::*;

#[test]
fn basic_table() {
    html_opts!(
        [gfm_table],
        "| a | b |\n|---|---|\n| c | d |\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n<td>c</td>\n<td>d</td>\n</tr>\n",
            "</tbody>\n",
            "</table>\n"
        ),
    );
}

#[test]
fn alignments() {
    html_opts!(
        [gfm_table],
        "| l | c | r |\n|:--|:-:|--:|\n| 1 | 2 | 3 |\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n",
            "<th align=\"left\">l</th>\n",
            "<th align=\"center\">c</th>\n",
            "<th align=\"right\">r</th>\n",
            "</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n",
            "<td align=\"left\">1</td>\n",
            "<td align=\"center\">2</td>\n",
            "<td align=\"right\">3</td>\n",
            "</tr>\n",
            "</tbody>\n",
            "</table>\n"
        ),
    );
}

#[test]
fn header_only_table_has_no_tbody() {
    html_opts!(
        [gfm_table],
        "| a |\n|---|\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n<th>a</th>\n</tr>\n",
            "</thead>\n",
            "</table>\n"
        ),
    );
}

#[test]
fn column_count_must_match() {
    html_opts!(
        [gfm_table],
        "| a | b |\n|---|\n",
        "<p>| a | b |\n|---|</p>\n",
    );
}

#[test]
fn short_rows_are_padded() {
    html_opts!(
        [gfm_table],
        "| a | b |\n|---|---|\n| c |\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n<th>a</th>\n<th>b</th>\n</tr>\n",
            "</thead>\n",
            "<tbody>\n",
            "<tr>\n<td>c</td>\n<td></td>\n</tr>\n",
            "</tbody>\n",
            "</table>\n"
        ),
    );
}

#[test]
fn escaped_pipe_stays_in_cell() {
    html_opts!(
        [gfm_table],
        "| a\\|b |\n|---|\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n<th>a|b</th>\n</tr>\n",
            "</thead>\n",
            "</table>\n"
        ),
    );
}

#[test]
fn table_ends_at_non_row() {
    html_opts!(
        [gfm_table],
        "| a |\n|---|\nplain\n",
        concat!(
            "<table>\n",
            "<thead>\n",
            "<tr>\n<th>a</th>\n</tr>\n",
            "</thead>\n",
            "</table>\n",
            "<p>plain</p>\n"
        ),
    );
}

#[test]
fn tables_need_the_option() {
    html(
        "| a |\n|---|\n",
        "<p>| a |\n|---|</p>\n",
    );
}
