#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use crate::astar::{
        astar, AStarDriver, AStarOptions, FastPath, SearchSpace, SearchStatus,
    };
    use crate::greedy::{GreedyOptions, GreedyWalker};
    use crate::heap::MinHeap;
    use crate::memo::{LruMemo, SingleMemo};
    use crate::mesh::NavMesh;
    use crate::{
        moves_of, position_mesh, solve_board, solve_board_greedy, solve_bottom_right,
        AdmissibleHeuristic, Board, BoardError, SearchError, SolveOptions,
    };

    fn assert_valid_play(path: &[Board]) {
        for pair in path.windows(2) {
            assert!(
                pair[0].neighbor_boards().contains(&pair[1]),
                "step is not a legal move"
            );
        }
    }

    // board model

    #[test]
    fn board_sizes() {
        assert_eq!(Board::from_cells(vec![0; 100]).unwrap().size(), 10);
        assert_eq!(Board::from_cells(vec![0; 25]).unwrap().size(), 5);
    }

    #[test]
    fn parse_plain() {
        let board = Board::parse("012345678").unwrap();
        assert_eq!(board.size(), 3);
        assert_eq!(
            (0..9).map(|pos| board.color_at(pos)).collect::<Vec<_>>(),
            vec![0, 1, 2, 3, 4, 5, 6, 7, 8]
        );
    }

    #[test]
    fn parse_ignores_noise() {
        assert_eq!(
            Board::parse("--0*1kbc\n23 456i7_8 ").unwrap(),
            Board::parse("012345678").unwrap()
        );
    }

    #[test]
    fn parse_rejects_non_square() {
        assert_eq!(
            Board::parse("012"),
            Err(BoardError::NotSquare { cells: 3 })
        );
        assert_eq!(Board::parse(""), Err(BoardError::NotSquare { cells: 0 }));
        assert_eq!(
            "no digits at all".parse::<Board>(),
            Err(BoardError::NotSquare { cells: 0 })
        );
    }

    #[test]
    fn display_round_trips() {
        let text = "0123\n4567\n8901\n2345";
        assert_eq!(Board::parse(text).unwrap().to_string(), text);
    }

    #[test]
    fn random_too_small() {
        assert_eq!(
            Board::random(2, 5),
            Err(BoardError::TooSmall { size: 2, colors: 5 })
        );
    }

    #[test]
    fn random_holds_every_color() {
        let board = Board::random(5, 25).unwrap();
        let mut colors = board.colors();
        colors.sort_unstable();
        assert_eq!(colors, (0..25).collect::<Vec<_>>());

        let board = Board::random(14, 6).unwrap();
        assert_eq!(board.len(), 196);
        let mut colors = board.colors();
        colors.sort_unstable();
        assert_eq!(colors, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn adjacent_position_counts() {
        let board = Board::from_cells(vec![0; 25]).unwrap();
        for corner in [0, 4, 20, 24] {
            assert_eq!(board.adjacent_positions(corner).len(), 2);
        }
        for edge in [2, 10, 14, 22] {
            assert_eq!(board.adjacent_positions(edge).len(), 3);
        }
        assert_eq!(board.adjacent_positions(12).len(), 4);
    }

    #[test]
    fn uniform_blob_covers_board() {
        for n in 1..=20 {
            let board = Board::from_cells(vec![3; n * n]).unwrap();
            assert_eq!(board.blob_positions(0).len(), n * n);
            assert_eq!(board.perimeter(0), 0);
        }
    }

    #[test]
    fn unique_colors_make_unit_blobs() {
        let board = Board::parse("012345678").unwrap();
        for pos in 0..9 {
            assert_eq!(board.blob_size(pos), 1);
        }
        assert_eq!(board.net_blob_count(), 9);
    }

    #[test]
    fn play_color_floods_the_top_left_blob() {
        let board = Board::parse("0001\n0203\n0455\n0000").unwrap();
        let played = board.play_color(9);
        assert_eq!(played.to_string(), "9991\n9293\n9455\n9999");
        // inputs are never mutated
        assert_eq!(board.to_string(), "0001\n0203\n0455\n0000");
        assert_eq!(played.color_at(0), 9);
    }

    #[test]
    fn play_current_color_is_identity() {
        let board = Board::parse("0012\n0223\n1332\n1144").unwrap();
        assert_eq!(board.play_color(board.color_at(0)), board);
    }

    #[test]
    fn perimeter_of_irregular_blob() {
        let board = Board::parse("212221\n222321\n002220\n000111\n111111\n222222").unwrap();
        assert_eq!(board.perimeter(0), 10);
        let mut colors = board.perimeter_colors(0);
        colors.sort_unstable();
        assert_eq!(colors, vec![0, 1, 3]);
    }

    #[test]
    fn inset_square_perimeter() {
        for n in 4..=8 {
            let cells = (0..n * n)
                .map(|pos| {
                    let (x, y) = (pos % n, pos / n);
                    u8::from(x > 0 && x < n - 1 && y > 0 && y < n - 1)
                })
                .collect::<Vec<_>>();
            let board = Board::from_cells(cells).unwrap();
            assert_eq!(board.perimeter(board.position(1, 1)), 4 * (n - 2));
        }
    }

    #[test]
    fn neighbor_boards_prefer_an_absorbing_move() {
        // playing 1 absorbs every 1 on the board, so that move dominates
        let board = Board::parse("0012\n0223\n1332\n1144").unwrap();
        let neighbors = board.neighbor_boards();
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].color_at(0), 1);
        assert!(neighbors[0].blob_is_whole(0));
    }

    #[test]
    fn neighbor_boards_change_the_top_left_color() {
        let board = Board::parse("212221\n222321\n002220\n000111\n111111\n222222").unwrap();
        let neighbors = board.neighbor_boards();
        assert!(!neighbors.is_empty());
        for neighbor in &neighbors {
            assert_ne!(neighbor.color_at(0), board.color_at(0));
        }
    }

    #[test]
    fn blob_distance_counts_gaps() {
        let board = Board::parse("000\n111\n000").unwrap();
        assert_eq!(board.blob_distance(0, 1), 0);
        assert_eq!(board.blob_distance(0, 3), 1);
        assert_eq!(board.blob_distance(0, 6), 2);
        assert_eq!(board.distance(0, 8), 4);
    }

    #[test]
    fn keys_fingerprint_the_cells() {
        let a = Board::parse("0123").unwrap();
        let b = Board::parse("0124").unwrap();
        assert_ne!(a.key(), b.key());
        assert_eq!(a.key(), Board::parse("0123").unwrap().key());
        assert_eq!(a.key().len(), a.len());
    }

    #[test]
    fn blob_map_numbers_in_scan_order() {
        let board = Board::parse("001\n011\n111").unwrap();
        let map = board.blob_map();
        assert_eq!(map.count(), 2);
        assert_eq!(
            (0..9).map(|pos| map.id_at(pos)).collect::<Vec<_>>(),
            vec![1, 1, 2, 1, 2, 2, 2, 2, 2]
        );
        assert_eq!(board.perimeter_blobs(0), vec![2]);
    }

    #[test]
    fn blob_counts_and_segmentation() {
        let checkerboard = Board::parse("0101\n1010\n0101\n1010").unwrap();
        assert_eq!(checkerboard.net_blob_count(), 16);
        let counts = checkerboard.blob_counts();
        assert_eq!(counts[&0], 8);
        assert_eq!(counts[&1], 8);
        assert!(checkerboard.all_blobs_segmented());

        let stripes = Board::parse("01\n01").unwrap();
        assert_eq!(stripes.net_blob_count(), 2);
        assert!(!stripes.all_blobs_segmented());
        assert!(!stripes.colors_segmented(&[0]));
        assert!(stripes.colors_segmented(&[]));
    }

    #[test]
    fn cached_views_leave_board_identity_alone() {
        let warmed = Board::parse("0012\n0223\n1332\n1144").unwrap();
        let cold = Board::parse("0012\n0223\n1332\n1144").unwrap();
        // fill every cached view on one board only
        let _ = warmed.key();
        let _ = warmed.colors();
        let _ = warmed.perimeter_blocks(0);
        let _ = warmed.perimeter_colors(0);
        assert_eq!(warmed, cold);
        assert_eq!(warmed.key(), cold.key());
        assert_eq!(warmed.colors(), cold.colors());
        assert_eq!(warmed.perimeter_blocks(0), cold.perimeter_blocks(0));
        assert_eq!(warmed.perimeter_colors(0), cold.perimeter_colors(0));

        // a played board answers from its own cells, not the parent's cache
        let played = warmed.play_color(1);
        assert!(!played.colors().contains(&0));
        assert_ne!(played.key(), warmed.key());
    }

    #[test]
    fn blob_wholeness() {
        assert!(Board::from_cells(vec![7; 16]).unwrap().blob_is_whole(0));
        assert!(Board::parse("01\n00").unwrap().blob_is_whole(0));
        assert!(!Board::parse("010\n101\n010").unwrap().blob_is_whole(0));
    }

    // memo

    #[test]
    fn lru_memo_evicts_in_insertion_order() {
        let mut memo = LruMemo::new(2);
        memo.insert("a", 1);
        memo.insert("b", 2);
        // a read does not refresh recency
        assert_eq!(memo.get(&"a"), Some(&1));
        memo.insert("c", 3);
        assert_eq!(memo.get(&"a"), None);
        assert_eq!(memo.get(&"b"), Some(&2));
        assert_eq!(memo.get(&"c"), Some(&3));
        assert_eq!(memo.len(), 2);
    }

    #[test]
    fn lru_memo_overwrite_keeps_one_entry() {
        let mut memo = LruMemo::new(2);
        memo.insert("a", 1);
        memo.insert("a", 9);
        assert_eq!(memo.len(), 1);
        assert_eq!(memo.get(&"a"), Some(&9));
    }

    #[test]
    fn lru_memo_computes_once_per_key() {
        let mut memo = LruMemo::new(10);
        let mut calls = 0;
        memo.get_or_insert_with("k", || {
            calls += 1;
            7
        });
        let value = memo.get_or_insert_with("k", || {
            calls += 1;
            7
        });
        assert_eq!(value, 7);
        assert_eq!(calls, 1);
    }

    #[test]
    fn single_memo_elides_repeated_calls() {
        let mut memo = SingleMemo::new();
        let mut calls = 0;
        let first = memo.get_or_insert_with("x", || {
            calls += 1;
            10
        });
        let second = memo.get_or_insert_with("x", || {
            calls += 1;
            10
        });
        assert_eq!((first, second, calls), (10, 10, 1));

        // a new key replaces the slot, and returning to the old one recomputes
        let third = memo.get_or_insert_with("y", || {
            calls += 1;
            20
        });
        assert_eq!((third, calls), (20, 2));
        let fourth = memo.get_or_insert_with("x", || {
            calls += 1;
            30
        });
        assert_eq!((fourth, calls), (30, 3));
    }

    // heap

    #[test]
    fn heap_pops_keys_ascending() {
        let mut heap = MinHeap::new();
        for (key, value) in [(3.0, 'c'), (1.0, 'a'), (2.0, 'b'), (1.0, 'd')] {
            heap.put(key, value);
        }
        assert_eq!(heap.len(), 4);
        let mut popped = Vec::new();
        while !heap.is_empty() {
            popped.push(heap.pop_pair().unwrap());
        }
        let keys = popped.iter().map(|(key, _)| *key).collect::<Vec<_>>();
        assert_eq!(keys, vec![1.0, 1.0, 2.0, 3.0]);
        let mut values = popped.iter().map(|(_, value)| *value).collect::<Vec<_>>();
        values.sort_unstable();
        assert_eq!(values, vec!['a', 'b', 'c', 'd']);
    }

    #[test]
    fn heap_rejects_empty_pop() {
        assert_eq!(
            MinHeap::<u32>::new().pop_pair(),
            Err(SearchError::EmptyHeap)
        );
    }

    // greedy walker

    #[test]
    fn greedy_walks_and_memoizes() {
        let mut walker = GreedyWalker::new(GreedyOptions::default());
        let mut calls = 0;
        let path = walker.walk(
            0u32,
            |node| *node == 3,
            |node| {
                calls += 1;
                vec![node + 1]
            },
            |_| 0.0,
            |node| *node,
        );
        assert_eq!(path, vec![0, 1, 2, 3]);
        assert_eq!(calls, 3);

        // second walk from the same start is served from the memo
        let path = walker.walk(
            0u32,
            |node| *node == 3,
            |node| {
                calls += 1;
                vec![node + 1]
            },
            |_| 0.0,
            |node| *node,
        );
        assert_eq!(path, vec![0, 1, 2, 3]);
        assert_eq!(calls, 3);
    }

    #[test]
    fn greedy_score_direction() {
        let mut lower = GreedyWalker::new(GreedyOptions { prefer_lower: true });
        let path = lower.walk(
            0u32,
            |node| *node != 0,
            |_| vec![1, 2],
            |node| *node as f32,
            |node| *node,
        );
        assert_eq!(path, vec![0, 1]);

        let mut higher = GreedyWalker::new(GreedyOptions::default());
        let path = higher.walk(
            0u32,
            |node| *node != 0,
            |_| vec![1, 2],
            |node| *node as f32,
            |node| *node,
        );
        assert_eq!(path, vec![0, 2]);
    }

    // navigation mesh

    fn diamond_edges() -> HashMap<u32, Vec<u32>> {
        HashMap::from([
            (0, vec![1, 3]),
            (1, vec![0, 2]),
            (2, vec![1, 3]),
            (3, vec![0, 2]),
        ])
    }

    fn diamond_distance(a: u32, b: u32) -> f32 {
        // the direct 0-3 edge is expensive; everything else costs 1
        if (a.min(b), a.max(b)) == (0, 3) {
            5.0
        } else {
            1.0
        }
    }

    #[test]
    fn mesh_finds_shortest_paths() {
        let edges = diamond_edges();
        let mesh = NavMesh::build(
            0,
            |node| edges[&node].clone(),
            diamond_distance,
        )
        .unwrap();
        assert_eq!(mesh.path_to(2), Some(vec![0, 1, 2]));
        assert_eq!(mesh.distance_to(2), Some(2.0));
        // 3 is first relaxed over the direct edge, then improved through 1-2;
        // the stale heap entry must be skipped
        assert_eq!(mesh.path_to(3), Some(vec![0, 1, 2, 3]));
        assert_eq!(mesh.distance_to(3), Some(3.0));
    }

    #[test]
    fn mesh_source_and_unreachable() {
        let edges = diamond_edges();
        let mesh = NavMesh::build(0, |node| edges[&node].clone(), |_, _| 1.0).unwrap();
        assert_eq!(mesh.path_to(0), Some(vec![0]));
        assert_eq!(mesh.path_to(42), None);
        assert_eq!(mesh.distance_to(42), None);
    }

    // A* engine

    struct LineSpace {
        goal: u32,
        fast_at: Option<u32>,
    }

    impl SearchSpace for LineSpace {
        type Node = u32;
        type Key = u32;

        fn key(&self, node: &u32) -> u32 {
            *node
        }

        fn is_end(&self, node: &u32) -> bool {
            *node == self.goal
        }

        fn neighbors(&mut self, node: &u32) -> Vec<u32> {
            if *node < self.goal {
                vec![node + 1]
            } else {
                vec![]
            }
        }

        fn distance(&mut self, _from: &u32, _to: &u32) -> f32 {
            1.0
        }

        fn heuristic(&mut self, node: &u32) -> f32 {
            (self.goal - node) as f32
        }

        fn fast_solve(&mut self, node: &u32) -> Option<FastPath<u32>> {
            if Some(*node) == self.fast_at {
                Some(FastPath {
                    cost: (self.goal - node) as f32,
                    path: vec![*node, 999],
                })
            } else {
                None
            }
        }
    }

    struct GraphSpace {
        edges: HashMap<u32, Vec<u32>>,
        goal: u32,
    }

    impl SearchSpace for GraphSpace {
        type Node = u32;
        type Key = u32;

        fn key(&self, node: &u32) -> u32 {
            *node
        }

        fn is_end(&self, node: &u32) -> bool {
            *node == self.goal
        }

        fn neighbors(&mut self, node: &u32) -> Vec<u32> {
            self.edges.get(node).cloned().unwrap_or_default()
        }

        fn distance(&mut self, _from: &u32, _to: &u32) -> f32 {
            1.0
        }
    }

    #[test]
    fn astar_walks_a_line() {
        let space = LineSpace {
            goal: 5,
            fast_at: None,
        };
        let path = astar(space, 0, AStarOptions::default()).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3, 4, 5]);
    }

    #[test]
    fn astar_takes_the_shorter_branch() {
        let space = GraphSpace {
            edges: HashMap::from([
                (0, vec![1, 9]),
                (1, vec![2]),
                (2, vec![3]),
                (9, vec![3]),
            ]),
            goal: 3,
        };
        let path = astar(space, 0, AStarOptions::default()).unwrap();
        assert_eq!(path, vec![0, 9, 3]);
    }

    #[test]
    fn astar_reports_no_path() {
        let space = GraphSpace {
            edges: HashMap::from([(0, vec![1]), (1, vec![])]),
            goal: 9,
        };
        assert_eq!(
            astar(space, 0, AStarOptions::default()),
            Err(SearchError::NoPathFound)
        );
    }

    #[test]
    fn astar_f_cost_ceiling_prunes_everything() {
        let space = LineSpace {
            goal: 5,
            fast_at: None,
        };
        let options = AStarOptions {
            max_f_cost: Some(3.0),
            ..AStarOptions::default()
        };
        assert_eq!(astar(space, 0, options), Err(SearchError::NoPathFound));
    }

    #[test]
    fn astar_fast_solver_splices_its_path() {
        let space = LineSpace {
            goal: 10,
            fast_at: Some(4),
        };
        let path = astar(space, 0, AStarOptions::default()).unwrap();
        assert_eq!(path, vec![0, 1, 2, 3, 4, 999]);
    }

    #[test]
    fn driver_pauses_and_resumes() {
        let space = LineSpace {
            goal: 300,
            fast_at: None,
        };
        let mut driver = AStarDriver::new(space, 0, AStarOptions::default());
        assert!(matches!(driver.step(), SearchStatus::Pending));

        driver.pause();
        assert!(driver.is_paused());
        assert!(matches!(driver.step(), SearchStatus::Pending));

        driver.resume();
        let mut blocks = 0;
        loop {
            match driver.step() {
                SearchStatus::Pending => blocks += 1,
                SearchStatus::Done(result) => {
                    let path = result.unwrap();
                    assert_eq!(path.len(), 301);
                    assert_eq!(path[0], 0);
                    assert_eq!(path[300], 300);
                    break;
                }
            }
            assert!(blocks < 100, "driver failed to finish");
        }
    }

    // solver

    #[test]
    fn solving_a_uniform_board_is_a_single_state() {
        for n in 1..=20 {
            let board = Board::from_cells(vec![2; n * n]).unwrap();
            let path = solve_board(&board, &SolveOptions::default()).unwrap();
            assert_eq!(path.len(), 1);
            assert_eq!(path[0], board);
        }
    }

    #[test]
    fn solve_board_reaches_a_uniform_terminal() {
        let board = Board::parse("0012\n0223\n1332\n1144").unwrap();
        let path = solve_board(&board, &SolveOptions::default()).unwrap();
        assert_eq!(path[0], board);
        assert!(path.last().unwrap().is_uniform());
        assert_valid_play(&path);
    }

    #[test]
    fn admissible_mode_is_no_worse_than_weighted() {
        let board = Board::parse("212221\n222321\n002220\n000111\n111111\n222222").unwrap();
        let weighted = solve_board(&board, &SolveOptions::default()).unwrap();
        let optimal = solve_board(
            &board,
            &SolveOptions {
                admissible: true,
                ..SolveOptions::default()
            },
        )
        .unwrap();
        assert!(optimal.last().unwrap().is_uniform());
        assert_valid_play(&optimal);
        assert!(optimal.len() <= weighted.len());
    }

    #[test]
    fn admissible_estimate_never_overshoots_an_optimal_path() {
        let board = Board::random(5, 4).unwrap();
        let path = solve_board(
            &board,
            &SolveOptions {
                admissible: true,
                ..SolveOptions::default()
            },
        )
        .unwrap();
        let heuristic = AdmissibleHeuristic::new(&board).unwrap();
        let moves = path.len() - 1;
        for (index, state) in path.iter().enumerate() {
            // an optimal path leaves exactly moves - index moves from here
            assert!(heuristic.estimate(state) <= (moves - index) as f32 + 1e-3);
        }
        assert_eq!(heuristic.estimate(path.last().unwrap()), 0.0);
        assert!(heuristic.estimate(&board) >= (board.colors().len() - 1) as f32);
    }

    #[test]
    fn weighted_solve_tracks_the_greedy_bound() {
        let board = Board::random(10, 6).unwrap();
        let greedy = solve_board_greedy(&board, 0).unwrap();
        assert_eq!(greedy[0], board);
        assert!(greedy.last().unwrap().is_uniform());
        assert_valid_play(&greedy);

        let weighted = solve_board(&board, &SolveOptions::default()).unwrap();
        assert!(weighted.last().unwrap().is_uniform());
        assert_valid_play(&weighted);
        assert!(weighted.len() <= greedy.len() + 1);
    }

    #[test]
    fn greedy_look_ahead_still_solves() {
        let board = Board::random(8, 5).unwrap();
        let path = solve_board_greedy(&board, 1).unwrap();
        assert!(path.last().unwrap().is_uniform());
        assert_valid_play(&path);
    }

    #[test]
    fn solve_bottom_right_reaches_the_corner() {
        let board = Board::parse("0012\n0223\n1332\n1144").unwrap();
        let path = solve_bottom_right(&board, 0.5).unwrap();
        assert_valid_play(&path);
        let terminal = path.last().unwrap();
        assert!(terminal.blob_positions(0).contains(&(terminal.len() - 1)));
    }

    #[test]
    fn position_mesh_chains_blobs() {
        let board = Board::parse("01\n23").unwrap();
        let mesh = position_mesh(&board, 3).unwrap();
        let path = mesh.path_from(0).unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(path[0], 1);
        assert_eq!(path[2], 4);
        assert_eq!(mesh.path_from(3), Some(vec![4]));
    }

    #[test]
    fn moves_replay_the_solution() {
        let board = Board::parse("0012\n0223\n1332\n1144").unwrap();
        let path = solve_board(&board, &SolveOptions::default()).unwrap();
        let moves = moves_of(&path);
        assert_eq!(moves.len(), path.len() - 1);
        let mut replay = board;
        for color in moves {
            replay = replay.play_color(color);
        }
        assert_eq!(&replay, path.last().unwrap());
    }
}
